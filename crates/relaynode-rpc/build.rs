use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Use the vendored protoc unless the environment provides one.
    if std::env::var_os("PROTOC").is_none() {
        let protoc = protoc_bin_vendored::protoc_bin_path()?;
        // SAFETY: build scripts are single-threaded at this point.
        unsafe { std::env::set_var("PROTOC", protoc) };
    }

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&["proto/node.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/node.proto");
    Ok(())
}
