use loanbook_core::{
    evaluate_eligibility, presence_only_eligibility, Account, AccountRepository, AccountService,
    AccountType, CredentialKind, Credentials, EligibilityError, ErrorKind, LoanProduct,
    ServiceError, SqliteAccountRepository, StoreConfig,
};

fn account(kind: Option<AccountType>, pan: Option<&str>, tan: Option<&str>) -> Account {
    Account {
        account_id: 1,
        account_name: "Holder".to_string(),
        account_type: kind,
        balance: 100.0,
        pan_number: pan.map(str::to_string),
        tan_number: tan.map(str::to_string),
        balance_category: None,
    }
}

const ALL_SAVING: [LoanProduct; 4] = [
    LoanProduct::HomeLoan,
    LoanProduct::CarLoan,
    LoanProduct::EducationLoan,
    LoanProduct::PersonalLoan,
];

#[test]
fn saving_account_with_matching_pan_gets_four_loans() {
    let saving = account(Some(AccountType::Saving), Some("P1"), None);
    let loans = evaluate_eligibility(&saving, &Credentials::pan("P1")).unwrap();
    assert_eq!(loans, ALL_SAVING.to_vec());
    assert!(!loans.contains(&LoanProduct::BusinessLoan));
}

#[test]
fn saving_account_rejects_wrong_or_missing_pan() {
    let saving = account(Some(AccountType::Saving), Some("P1"), None);

    let mismatch = evaluate_eligibility(&saving, &Credentials::pan("P2")).unwrap_err();
    assert_eq!(
        mismatch,
        EligibilityError::CredentialMismatch(CredentialKind::Pan)
    );
    assert_eq!(mismatch.kind(), ErrorKind::CredentialMismatch);

    let missing = evaluate_eligibility(&saving, &Credentials::default()).unwrap_err();
    assert_eq!(
        missing,
        EligibilityError::MissingCredential(CredentialKind::Pan)
    );
    assert_eq!(missing.to_string(), "pan required");

    let empty = evaluate_eligibility(&saving, &Credentials::pan("")).unwrap_err();
    assert_eq!(
        empty,
        EligibilityError::MissingCredential(CredentialKind::Pan)
    );

    let tan_only = evaluate_eligibility(&saving, &Credentials::tan("P1")).unwrap_err();
    assert_eq!(tan_only.kind(), ErrorKind::MissingCredential);
}

#[test]
fn current_account_with_matching_tan_gets_business_loan() {
    let current = account(Some(AccountType::Current), None, Some("T1"));
    assert_eq!(
        evaluate_eligibility(&current, &Credentials::tan("T1")).unwrap(),
        vec![LoanProduct::BusinessLoan]
    );

    let mismatch = evaluate_eligibility(&current, &Credentials::tan("T2")).unwrap_err();
    assert_eq!(
        mismatch,
        EligibilityError::CredentialMismatch(CredentialKind::Tan)
    );

    let missing = evaluate_eligibility(&current, &Credentials::pan("T1")).unwrap_err();
    assert_eq!(
        missing,
        EligibilityError::MissingCredential(CredentialKind::Tan)
    );
    assert_eq!(missing.to_string(), "tan required");
}

#[test]
fn presented_credential_against_unset_stored_value_is_a_mismatch() {
    let saving = account(Some(AccountType::Saving), None, None);
    assert_eq!(
        evaluate_eligibility(&saving, &Credentials::pan("P1")).unwrap_err(),
        EligibilityError::CredentialMismatch(CredentialKind::Pan)
    );
}

#[test]
fn untyped_account_is_never_eligible() {
    let untyped = account(None, Some("P1"), Some("T1"));
    let err = evaluate_eligibility(
        &untyped,
        &Credentials {
            pan_number: Some("P1".to_string()),
            tan_number: Some("T1".to_string()),
        },
    )
    .unwrap_err();
    assert_eq!(err, EligibilityError::InvalidAccountType);
    assert_eq!(err.kind(), ErrorKind::InvalidAccountType);
    assert!(presence_only_eligibility(&untyped).is_empty());
}

#[test]
fn presence_mode_only_checks_stored_values() {
    let saving = account(Some(AccountType::Saving), Some("ABCDE1234F"), None);
    assert_eq!(presence_only_eligibility(&saving), ALL_SAVING.to_vec());

    let current = account(Some(AccountType::Current), None, Some("TAN1234567"));
    assert_eq!(
        presence_only_eligibility(&current),
        vec![LoanProduct::BusinessLoan]
    );

    let no_pan = account(Some(AccountType::Saving), None, None);
    assert!(presence_only_eligibility(&no_pan).is_empty());
    let blank_pan = account(Some(AccountType::Saving), Some(""), None);
    assert!(presence_only_eligibility(&blank_pan).is_empty());
    let current_without_tan = account(Some(AccountType::Current), Some("P1"), None);
    assert!(presence_only_eligibility(&current_without_tan).is_empty());
}

#[test]
fn loan_products_serialize_as_display_names() {
    let json = serde_json::to_value(ALL_SAVING).unwrap();
    assert_eq!(
        json,
        serde_json::json!(["home loan", "car loan", "education loan", "personal loan"])
    );
}

#[test]
fn service_looks_up_account_before_evaluating() {
    let dir = tempfile::tempdir().unwrap();
    let repo = SqliteAccountRepository::new(StoreConfig::new(dir.path().join("loans.db")));
    repo.create_schema().unwrap();
    let mut stored = account(Some(AccountType::Saving), Some("P1"), None);
    stored.account_id = 11;
    repo.insert(&stored).unwrap();
    let service = AccountService::new(repo);

    assert_eq!(
        service.loan_eligibility(11, &Credentials::pan("P1")).unwrap(),
        ALL_SAVING.to_vec()
    );
    assert_eq!(
        service
            .loan_eligibility(11, &Credentials::pan("P2"))
            .unwrap_err()
            .kind(),
        ErrorKind::CredentialMismatch
    );
    assert!(matches!(
        service.loan_eligibility(12, &Credentials::pan("P1")),
        Err(ServiceError::NotFound(12))
    ));
    assert_eq!(
        service.presence_loan_eligibility(11).unwrap(),
        ALL_SAVING.to_vec()
    );
}
