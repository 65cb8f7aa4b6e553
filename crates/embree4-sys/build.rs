use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo::rerun-if-env-changed=EMBREE_DIR");
    let Ok(embree_dir) = env::var("EMBREE_DIR") else {
        panic!("EMBREE_DIR must point at an Embree 4 install");
    };
    let embree_dir = PathBuf::from(embree_dir);
    let embree_lib_dir = embree_dir.join("lib");

    // pass lib folder which is being linked against to dependencies
    println!("cargo::metadata=lib={}", embree_lib_dir.display());
    println!("cargo::rustc-link-search=native={}", embree_lib_dir.display());
    println!("cargo::rustc-link-lib=embree4");
    println!("cargo::rerun-if-changed=wrapper.h");

    let include_path = format!("-I{}", embree_dir.join("include").display());
    let bindings = bindgen::Builder::default()
        .header("wrapper.h")
        .clang_arg(include_path)
        .allowlist_function("rtc.*")
        .allowlist_type("RTC.*")
        // enums used as flag words or switch values
        .constified_enum_module("RTCError")
        .constified_enum_module("RTCSceneFlags")
        .constified_enum_module("RTCBuildQuality")
        .constified_enum_module("RTCGeometryType")
        .constified_enum_module("RTCBufferType")
        .constified_enum_module("RTCFormat")
        .constified_enum_module("RTCRayQueryFlags")
        .constified_enum_module("RTCFeatureFlags")
        .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
        .generate()
        .expect("unable to generate embree bindings");

    let out_path = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    bindings
        .write_to_file(out_path.join("bindings.rs"))
        .expect("couldn't write embree bindings");
}
