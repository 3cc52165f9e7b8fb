fn main() {
    #[cfg(feature = "grpc")]
    {
        if std::env::var_os("PROTOC").is_none() {
            if let Ok(protoc) = protoc_bin_vendored::protoc_bin_path() {
                std::env::set_var("PROTOC", protoc);
            }
        }

        tonic_build::configure()
            .build_server(true)
            .build_client(true)
            .compile(&["proto/auth.proto"], &["proto"])
            .unwrap();
    }
}
