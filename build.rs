fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/gtfs-realtime.proto");

    let protoc_path = protoc_bin_vendored::protoc_bin_path()?;

    unsafe {
        std::env::set_var("PROTOC", protoc_path);
    }

    prost_build::Config::new()
        .enum_attribute(".", "#[derive(serde::Serialize)]")
        .compile_protos(&["proto/gtfs-realtime.proto"], &["proto/"])?;

    Ok(())
}
