//! # Folio CLI
//!
//! Usage:
//!   folio invoice.json -o out/ --logo logo.png
//!   cat invoice.json | folio --recompute-totals
//!   folio --example > invoice.json

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use log::warn;

use folio::config::{LayoutConfig, NoteBreak, NotePosition, PageSize};
use folio::error::FolioError;
use folio::model::Totals;
use folio::ExportReport;

#[derive(Parser, Debug)]
#[command(version, about = "Render a tax invoice to a paginated PDF", long_about = None)]
struct Args {
    /// Invoice JSON file. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Directory the PDF is written into.
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Logo as a file path, data URI or base64 string.
    #[arg(long)]
    logo: Option<String>,

    /// Layout config JSON file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Recompute the totals block from the line items instead of trusting the input.
    #[arg(long, default_value_t = false)]
    recompute_totals: bool,

    #[arg(long, value_enum)]
    page_size: Option<PageSizeArg>,

    #[arg(long, value_enum)]
    note_position: Option<NotePosition>,

    #[arg(long, value_enum)]
    note_break: Option<NoteBreak>,

    /// Print a sample invoice JSON and exit.
    #[arg(long, default_value_t = false)]
    example: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PageSizeArg {
    A4,
    Letter,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    if args.example {
        print!("{}", example_invoice_json());
        return;
    }

    match run(&args) {
        Ok(report) => {
            eprintln!(
                "✓ Written {} ({} page(s)) to {}",
                report.file_name,
                report.page_count,
                args.output.display()
            );
        }
        Err(e) => {
            eprintln!("✗ Export failed: {}", e);
            process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<ExportReport, FolioError> {
    let input = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mut config = match &args.config {
        Some(path) => LayoutConfig::from_json_file(path)?,
        None => LayoutConfig::default(),
    };
    if let Some(size) = args.page_size {
        config.page_size = match size {
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::Letter => PageSize::Letter,
        };
    }
    if let Some(position) = args.note_position {
        config.note.policy.position = position;
    }
    if let Some(page_break) = args.note_break {
        config.note.policy.page_break = page_break;
    }

    let mut doc = folio::parse_document(&input)?;
    if args.recompute_totals {
        let calc = doc.calculation;
        doc.calculation = Totals::compute(&doc.items, calc.discount, calc.discount_type);
    }
    if args.logo.is_none() {
        warn!("no logo given, the header is rendered without one");
    }

    fs::create_dir_all(&args.output)?;
    folio::export_invoice(&doc, args.logo.as_deref(), &config, &args.output)
}

fn example_invoice_json() -> &'static str {
    r##"{
  "items": [
    {
      "id": "1",
      "name": "Full service",
      "description": "Oil and filter change, 40-point inspection",
      "quantity": 1,
      "unitPrice": 289.0,
      "total": 289.0
    },
    {
      "id": "2",
      "name": "Brake pads",
      "description": "Front pads, machine rotors",
      "quantity": 2,
      "unitPrice": 85.5,
      "total": 171.0
    }
  ],
  "customerInfo": {
    "name": "Jordan Avery",
    "email": "jordan@example.com",
    "phone": "021 555 0142"
  },
  "vehicleInfo": {
    "registration": "KXT482",
    "odometer": "84,210 km",
    "makeModel": "Toyota Corolla"
  },
  "invoiceInfo": {
    "number": "INV-2026-0042",
    "date": "19/10/2026",
    "gstNumber": "123-456-789",
    "serviceDate": "18/10/2026",
    "nextServiceDate": "18/04/2027",
    "salesperson": "Sam",
    "enteredBy": "Kim",
    "crimNumber": "C-0917"
  },
  "companyInfo": {
    "name": "Harbour Auto Services",
    "address": ["12 Wharf Road", "Port Chalmers", "Dunedin 9023"],
    "phone": "03 555 0199"
  },
  "calculation": {
    "subtotal": 460.0,
    "discount": 5,
    "discountType": "percentage",
    "gst": 65.55,
    "total": 502.55,
    "rounding": 0.0
  },
  "saleNote": "Rear tyres are close to the legal limit; replace before the next WOF.\nCustomer declined wiper blades."
}
"##
}
