use crate::infra::load_classifier;
use clap::Args;
use loan_eligibility::config::{AppConfig, ConfigError};
use loan_eligibility::encoder::{ApplicantRecord, CreditPolicy};
use loan_eligibility::error::AppError;
use loan_eligibility::intake::{IntakeController, IntakeError, Transition};
use loan_eligibility::scoring::{
    score_csv, Classifier, LogisticModel, PredictionReport, ScoringService,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

const APPROVED_NOTES: &[&str] = &[
    "Key highlights of your application:",
    "- Good credit history score",
    "- Sufficient income to cover loan repayment",
    "- Positive factors supporting your loan approval",
    "Enjoy your financial journey with the new loan!",
];

const REJECTED_NOTES: &[&str] = &[
    "Possible reasons:",
    "- Low credit history score",
    "- Insufficient income for the loan amount requested",
    "- High debt-to-income ratio",
    "- Other potential risk factors",
    "Critical suggestions:",
    "- Improve your credit score by paying off existing debts.",
    "- Consider reducing your loan amount or opting for a longer repayment term.",
    "- Reassess your finances and improve your overall financial health before reapplying.",
];

#[derive(Args, Debug, Default)]
pub(crate) struct ModelArgs {
    /// Classifier artifact to load instead of LOAN_MODEL_PATH
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Credit score at or above which the credit-history flag is set (0-1000)
    #[arg(long)]
    pub(crate) credit_floor: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    #[arg(long, default_value = "Male")]
    pub(crate) gender: String,
    #[arg(long, default_value = "Yes")]
    pub(crate) married: String,
    /// 0, 1, 2 or 3+
    #[arg(long, default_value = "0")]
    pub(crate) dependents: String,
    #[arg(long, default_value = "Graduate")]
    pub(crate) education: String,
    #[arg(long, default_value = "No")]
    pub(crate) self_employed: String,
    #[arg(long, default_value_t = 5000.0)]
    pub(crate) applicant_income: f64,
    #[arg(long, default_value_t = 0.0)]
    pub(crate) coapplicant_income: f64,
    #[arg(long, default_value_t = 100.0)]
    pub(crate) loan_amount: f64,
    /// Loan term in days
    #[arg(long, default_value_t = 360.0)]
    pub(crate) loan_amount_term: f64,
    /// Raw credit score, or 0/1 for a precomputed credit-history flag
    #[arg(long, default_value_t = 750.0)]
    pub(crate) credit: f64,
    #[arg(long, default_value = "Urban")]
    pub(crate) property_area: String,
    #[command(flatten)]
    pub(crate) model: ModelArgs,
}

impl PredictArgs {
    fn applicant(&self) -> ApplicantRecord {
        ApplicantRecord {
            gender: self.gender.clone(),
            married: self.married.clone(),
            dependents: self.dependents.clone(),
            education: self.education.clone(),
            self_employed: self.self_employed.clone(),
            applicant_income: self.applicant_income,
            coapplicant_income: self.coapplicant_income,
            loan_amount: self.loan_amount,
            loan_amount_term: self.loan_amount_term,
            credit: self.credit,
            property_area: self.property_area.clone(),
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct ChatArgs {
    #[command(flatten)]
    pub(crate) model: ModelArgs,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// Applicant CSV export using the loan dataset column names
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Where to write the scored CSV (defaults to stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) model: ModelArgs,
}

fn resolve_policy(config: &AppConfig, floor: Option<f64>) -> Result<CreditPolicy, ConfigError> {
    match floor {
        Some(value) => CreditPolicy::with_floor(value).ok_or(ConfigError::InvalidCreditFloor {
            value: value.to_string(),
        }),
        None => Ok(config.scoring.credit_policy),
    }
}

fn load_scoring(args: ModelArgs) -> Result<ScoringService<LogisticModel>, AppError> {
    let config = AppConfig::load()?;
    let policy = resolve_policy(&config, args.credit_floor)?;
    let path = args.model.unwrap_or(config.scoring.model_path);
    let model = LogisticModel::from_path(&path)?;
    Ok(ScoringService::new(Arc::new(model), policy))
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let applicant = args.applicant();
    let service = load_scoring(args.model)?;

    println!("Loan prediction");
    println!("- Credit floor: {}", service.policy().floor());
    match service.score(&applicant) {
        Ok(report) => render_report(&report),
        Err(err) => println!("Error during prediction: {}", err),
    }
    Ok(())
}

fn render_report(report: &PredictionReport) {
    println!("- Features sent: {:?}", report.features_sent.to_array());
    match &report.probabilities {
        Some(probabilities) => println!(
            "- Model raw prediction: {} (probabilities {:?})",
            report.raw_prediction, probabilities
        ),
        None => println!("- Model raw prediction: {}", report.raw_prediction),
    }
    println!("\n{}", report.prediction_text);

    let (status, headline, notes) = if report.eligible {
        (
            "Approved",
            "Congratulations! Your loan application is likely approved!",
            APPROVED_NOTES,
        )
    } else {
        (
            "Rejected",
            "Danger! Your loan application has been rejected.",
            REJECTED_NOTES,
        )
    };
    println!("Loan Status: {}", status);
    println!("{}", headline);
    for line in notes {
        println!("  {}", line);
    }
}

pub(crate) fn run_chat(args: ChatArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let policy = resolve_policy(&config, args.model.credit_floor)?;
    let path = args.model.model.unwrap_or(config.scoring.model_path);
    let (classifier, _) = load_classifier(&path);
    let controller = IntakeController::new(Arc::new(ScoringService::new(classifier, policy)));

    let stdin = io::stdin();
    let stdout = io::stdout();
    chat_loop(&controller, stdin.lock(), stdout.lock())?;
    Ok(())
}

/// Drives one interview per input line until EOF or `quit`. `restart` begins a fresh interview.
pub(crate) fn chat_loop<C, R, W>(
    controller: &IntakeController<C>,
    input: R,
    mut output: W,
) -> io::Result<()>
where
    C: Classifier + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut transition = controller.start();
    print_reply(&mut output, &transition)?;

    for line in input.lines() {
        let line = line?;
        let command = line.trim();
        if command.eq_ignore_ascii_case("quit") || command.eq_ignore_ascii_case("exit") {
            break;
        }
        if command.eq_ignore_ascii_case("restart") {
            transition = controller.start();
            print_reply(&mut output, &transition)?;
            continue;
        }

        match controller.submit(&transition.session, &line) {
            Ok(next) => {
                transition = next;
                print_reply(&mut output, &transition)?;
            }
            Err(IntakeError::EmptyInput) => continue,
        }
    }

    output.flush()
}

fn print_reply<W: Write>(output: &mut W, transition: &Transition) -> io::Result<()> {
    writeln!(output, "assistant> {}", transition.reply.text)
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs {
        input,
        output,
        model,
    } = args;
    let service = load_scoring(model)?;
    let reader = BufReader::new(File::open(&input)?);

    let summary = match output {
        Some(path) => {
            let writer = BufWriter::new(File::create(&path)?);
            score_csv(reader, writer, service.classifier(), service.policy())?
        }
        None => {
            let stdout = io::stdout();
            score_csv(reader, stdout.lock(), service.classifier(), service.policy())?
        }
    };

    eprintln!(
        "Scored {} applicants from {} ({} eligible)",
        summary.scored,
        input.display(),
        summary.eligible
    );
    Ok(())
}
