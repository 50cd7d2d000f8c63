//! Integration tests for the drive client

mod cli_output_contracts;
mod retrieval_workflow;
mod support;
mod upload_workflow;
