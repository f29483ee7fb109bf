use facture::{DocumentRequest, GeneratorBuilder};
use std::env;
use std::fs;
use std::process;

// Mimalloc keeps heap fragmentation down across repeated generation runs
// with many small allocations.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// A simple CLI to generate an estimate or invoice PDF from a JSON request.
fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Generates an estimate/invoice PDF from a structured JSON request.");
        eprintln!();
        eprintln!("Usage: {} <path/to/request.json> <path/to/output.pdf>", args[0]);
        process::exit(1);
    }
    let input_path = &args[1];
    let output_path = &args[2];

    let request_json = match fs::read_to_string(input_path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("could not read {input_path}: {err}");
            process::exit(1);
        }
    };
    let request: DocumentRequest = match serde_json::from_str(&request_json) {
        Ok(request) => request,
        Err(err) => {
            eprintln!("invalid request in {input_path}: {err}");
            process::exit(1);
        }
    };

    let mut generator = GeneratorBuilder::new().with_debug(true).build();
    let output = match generator.generate(&request) {
        Ok(output) => output,
        Err(record) => {
            eprintln!("{}", record.message);
            eprintln!("  detail: {}", record.detail);
            for suggestion in record.suggestions {
                eprintln!("  hint: {suggestion}");
            }
            process::exit(1);
        }
    };

    if let Err(err) = fs::write(output_path, output.bytes.as_slice()) {
        eprintln!("could not write {output_path}: {err}");
        process::exit(1);
    }

    println!(
        "Generated {} ({} bytes, {} page(s)) in {} ms",
        output_path,
        output.report.pdf_size_bytes,
        output.report.page_count,
        output.report.render_time_ms()
    );
    println!("Suggested filename: {}", output.filename);
    let mem = &output.report.memory;
    println!(
        "[Monitor] RSS start: {:<4} MB | Peak: {:<4} MB | End: {:<4} MB",
        mem.start / 1024 / 1024,
        mem.peak / 1024 / 1024,
        mem.end / 1024 / 1024
    );
    for warning in &output.report.warnings {
        println!("warning: {warning}");
    }
}
