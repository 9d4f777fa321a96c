fn main() {
    // Only the board build links against ESP-IDF.
    #[cfg(feature = "esp")]
    embuild::espidf::sysenv::output();
}
