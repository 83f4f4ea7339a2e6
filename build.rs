fn main() {
    // Obfuscated remote-store credentials are baked in at compile time.
    println!("cargo:rerun-if-env-changed=ROOMCTL_XOR_KEY");
    println!("cargo:rerun-if-env-changed=ROOMCTL_DB_HOST_OBF");
    println!("cargo:rerun-if-env-changed=ROOMCTL_DB_AUTH_OBF");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
