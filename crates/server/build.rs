use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 使用 vendored protoc，避免依赖系统安装
    let protoc = protoc_bin_vendored::protoc_bin_path()?;
    std::env::set_var("PROTOC", protoc);

    let protos = [PathBuf::from("proto/phonebook.proto")];
    let includes = [PathBuf::from("proto"), protoc_bin_vendored::include_path()?];

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&protos, &includes)?;

    println!("cargo:rerun-if-changed=proto/phonebook.proto");
    Ok(())
}
