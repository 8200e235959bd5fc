//! Records the compiler that built the binary, e.g. `rustc 1.80.0 (051478957 2024-07-21)`

fn main() {
    let version = rustc_version::version_meta()
        .map(|meta| meta.short_version_string)
        .unwrap_or_else(|_| "rustc unknown".to_string());
    println!("cargo:rustc-env=MONOLITH_RUSTC_VERSION={}", version);
    println!("cargo:rerun-if-changed=build.rs");
}
