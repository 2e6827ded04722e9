use std::env;

use ngci::canon::Printer;
use ngci::error::Status;
use ngci::interp::Interpreter;

fn main() {
    tracing_subscriber::fmt::init();

    let filename = env::args().nth(1).expect("file name required");
    let block_delete = env::args().any(|arg| arg == "--block-delete");

    let mut interp = Interpreter::new(Printer::new());
    if let Err(e) = interp.open(&filename) {
        eprintln!("Error opening {}: {}", filename, e);
        return;
    }
    loop {
        match interp.read() {
            Err(e) => {
                eprintln!("Error in line {}: {}", interp.sequence_number() + 1, e);
                break;
            }
            Ok(Status::EndFile) => break,
            Ok(Status::ExecuteFinish) if block_delete => continue,
            Ok(_) => {}
        }
        match interp.execute() {
            Err(e) => {
                eprintln!("Error in line {}: {}", interp.sequence_number(), e);
                break;
            }
            Ok(Status::Exit) => break,
            Ok(_) => {}
        }
    }
    interp.close();
}
