/// Plain text body small enough to pass any upload policy.
pub fn text_document_fixture() -> &'static str {
    return r#"
Quarterly report

Revenue grew by 12% compared to the previous quarter. The board approved the
expansion into two new regions, with hiring planned for the second half of the
year.
"#
    .trim();
}

/// Two-row CSV used for upload tests.
pub fn csv_document_fixture() -> &'static str {
    return "region,revenue\nnorth,1200\nsouth,900";
}
