fn main() {
    adaptex::cli::run();
}
