fn main() -> std::process::ExitCode {
    savesync_lib::run()
}
