use std::process::ExitCode;

fn main() -> ExitCode {
    fastinfoset_view::app::run()
}
