use loan_eligibility::encoder::{encode, ApplicantRecord, CreditPolicy, RawApplication};
use loan_eligibility::scoring::{score_csv, LogisticModel, ScoringService, Verdict};
use serde_json::json;
use std::sync::Arc;

fn form(value: serde_json::Value) -> RawApplication {
    serde_json::from_value(value).expect("form payload")
}

#[test]
fn web_form_scenario_encodes_expected_vector() {
    let raw = form(json!({
        "gender": "Male",
        "married": "Yes",
        "dependents": "2",
        "education": "Graduate",
        "employed": "No",
        "ApplicantIncome": "5000",
        "CoapplicantIncome": "0",
        "LoanAmount": "100",
        "Loan_Amount_Term": "360",
        "credit": "750",
        "area": "Urban",
    }));

    let features = encode(&ApplicantRecord::from(&raw), &CreditPolicy::default());
    assert_eq!(features.credit_history, 0.0);
    assert_eq!(
        (
            features.dependents_1,
            features.dependents_2,
            features.dependents_3_plus
        ),
        (0.0, 1.0, 0.0)
    );
    assert_eq!(features.male, 1.0);
    assert_eq!(features.married, 1.0);
    assert_eq!(features.not_graduate, 0.0);
    assert_eq!(features.self_employed, 0.0);
    assert_eq!((features.semiurban, features.urban), (0.0, 1.0));
}

#[test]
fn dashboard_credit_floor_changes_only_the_credit_flag() {
    let raw = form(json!({ "credit": 820, "ApplicantIncome": 4000 }));
    let record = ApplicantRecord::from(&raw);
    let web = encode(&record, &CreditPolicy::default());
    let dashboard = encode(&record, &CreditPolicy::with_floor(800.0).expect("valid floor"));

    assert_eq!(web.credit_history, 0.0);
    assert_eq!(dashboard.credit_history, 1.0);
    assert_eq!(&web.to_array()[1..], &dashboard.to_array()[1..]);
}

#[test]
fn bundled_model_artifact_scores_forms() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../models/loan_model.json");
    let model = LogisticModel::from_path(path).expect("bundled model loads");
    let service = ScoringService::new(Arc::new(model), CreditPolicy::default());

    let strong = service
        .score_form(&form(json!({
            "Married": "Yes",
            "ApplicantIncome": 6000,
            "LoanAmount": 120,
            "Loan_Amount_Term": 360,
            "Credit_History": 1,
            "Property_Area": "Semiurban",
        })))
        .expect("scored");
    assert_eq!(strong.verdict, Verdict::Eligible);

    let weak = service
        .score_form(&form(json!({
            "ApplicantIncome": 6000,
            "LoanAmount": 120,
            "Loan_Amount_Term": 360,
            "Credit_History": 0,
        })))
        .expect("scored");
    assert_eq!(weak.verdict, Verdict::NotEligible);
}

#[test]
fn batch_scoring_reads_dataset_columns() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../models/loan_model.json");
    let model = LogisticModel::from_path(path).expect("bundled model loads");
    let csv = "Loan_ID,Gender,Married,Dependents,Education,Self_Employed,ApplicantIncome,CoapplicantIncome,LoanAmount,Loan_Amount_Term,Credit_History,Property_Area\n\
LP001015,Male,Yes,0,Graduate,No,5720,0,110,360,1,Urban\n\
LP001018,Male,Yes,2,Graduate,No,4006,1526,168,360,0,Urban\n";

    let mut output = Vec::new();
    let summary =
        score_csv(csv.as_bytes(), &mut output, &model, &CreditPolicy::default()).expect("scored");
    assert_eq!(summary.scored, 2);
    assert_eq!(summary.eligible, 1);

    let output = String::from_utf8(output).expect("utf8");
    assert!(output.contains("LP001015,true,Y"));
    assert!(output.contains("LP001018,false,N"));
}
