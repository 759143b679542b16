//! Error types for the editor

use stonecat_common::CommonError;
use stonecat_model::MetaIssue;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Matrix error: {0}")]
    Matrix(#[from] crate::matrix::MatrixError),

    #[error(transparent)]
    Hydrate(#[from] crate::hydrate::HydrateError),

    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("A save is in progress; the form is read-only until it finishes")]
    SavePending,

    #[error("No pending save with ticket {0}")]
    UnknownSaveTicket(String),

    #[error("Product form is invalid: {}", describe(.0))]
    Invalid(Vec<MetaIssue>),
}

fn describe(issues: &[MetaIssue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{} ({})", issue.message, issue.field))
        .collect::<Vec<_>>()
        .join(", ")
}
