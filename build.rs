fn main() {
    // Host builds (tests, fuzzing) have no ESP-IDF toolchain to link against.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
