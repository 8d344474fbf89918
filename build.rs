use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=FFMPEG_DIR");
    println!("cargo:rerun-if-env-changed=VCPKG_ROOT");
    println!("cargo:rerun-if-env-changed=VCPKGRS_DYNAMIC");
    println!("cargo:rerun-if-env-changed=VCPKGRS_TRIPLET");

    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" {
        return;
    }

    if env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    let vcpkg_root = match env::var("VCPKG_ROOT") {
        Ok(value) => value,
        Err(_) => {
            println!(
                "cargo:warning=FFMPEG_DIR is not set. meltdown links FFmpeg through ffmpeg-sys-next; on Windows, install FFmpeg via vcpkg and set VCPKG_ROOT + FFMPEG_DIR."
            );
            return;
        }
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let ffmpeg_dir = PathBuf::from(&vcpkg_root).join("installed").join(&triplet);

    if ffmpeg_dir.exists() {
        println!(
            "cargo:warning=Found a vcpkg FFmpeg install at {}. Set FFMPEG_DIR={} so ffmpeg-sys-next picks it up explicitly.",
            ffmpeg_dir.display(),
            ffmpeg_dir.display(),
        );
        if env::var_os("VCPKGRS_DYNAMIC").is_none() {
            println!(
                "cargo:warning=For vcpkg dynamic FFmpeg builds, also set VCPKGRS_DYNAMIC=1."
            );
        }
    } else {
        println!(
            "cargo:warning=VCPKG_ROOT is set but {} contains no FFmpeg install.",
            ffmpeg_dir.display(),
        );
    }
}
