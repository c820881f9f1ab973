use std::process::ExitCode;

use gitlab_bulk::workflow::Tool;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    gitlab_bulk::cli::main(Tool::Relabel).await
}
