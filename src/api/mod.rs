/// Remote report client for the landscaping analysis backend.
///
/// Two JSON endpoints are exposed:
///
/// - `POST {base}/analyze_landscaping` - evaluate before/after images against a task list
/// - `POST {base}/chat_query` - follow-up question against a previous analysis
///
/// # Usage
///
/// ```rust,no_run
/// use gardenkit::api::ReportClient;
/// use gardenkit::types::GenerateArgs;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = ReportClient::from_env()?;
/// let report = client
///     .submit_analysis(&GenerateArgs {
///         before_image: "data:image/jpeg;base64,...".into(),
///         after_image: None,
///         requested_tasks: "Mow the lawn".into(),
///         contractor_accomplishments: None,
///     })
///     .await?;
/// println!("{}", report.report);
/// # Ok(())
/// # }
/// ```
mod client;

pub use client::{ANALYZE_ENDPOINT, CHAT_QUERY_ENDPOINT, ReportClient};
