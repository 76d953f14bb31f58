use std::env;
use std::path::Path;
use std::process::ExitCode;

use helpdesk_cli::{build_assistant, init_logging, parse_question};
use helpdesk_core::config::Config;
use helpdesk_vector::LanceStore;

fn main() -> anyhow::Result<ExitCode> {
    init_logging();
    let args: Vec<String> = env::args().skip(1).collect();
    let question = match parse_question(&args) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("Error: {e}\nusage: helpdesk-ask \"<question>\"");
            return Ok(ExitCode::FAILURE);
        }
    };
    let settings = Config::load()?.settings()?;
    let store = LanceStore::open(Path::new(&settings.data.lancedb_dir))?;
    let assistant = match build_assistant(&settings, &store) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return Ok(ExitCode::FAILURE);
        }
    };

    match assistant.ask(&question) {
        Ok(answer) => {
            let rule = "=".repeat(50);
            println!("\n{rule}\nQuestion: {}\n{rule}\nAnswer:\n{}\n{rule}", answer.question, answer.answer);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {:#}", anyhow::Error::from(e));
            Ok(ExitCode::FAILURE)
        }
    }
}
