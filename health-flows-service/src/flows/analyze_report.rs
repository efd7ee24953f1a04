//! Report analyzer pipeline: extraction followed by analysis.

use super::analyze_health_data::{AnalyzeHealthDataFlow, HealthDataAnalysis};
use super::extract_health_data::{ExtractHealthDataFlow, ExtractHealthDataInput, ExtractedHealthData};
use super::{FlowError, FlowRunner};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportAnalysis {
    pub extracted: ExtractedHealthData,
    pub analysis: HealthDataAnalysis,
}

/// Extract data from the uploaded report, then analyze what was extracted.
///
/// The second call only starts once the first has finished; a failure in
/// either step fails the whole request.
pub async fn analyze_report(
    runner: &FlowRunner,
    input: &ExtractHealthDataInput,
) -> Result<ReportAnalysis, FlowError> {
    let extracted = runner.run::<ExtractHealthDataFlow>(input).await?;
    let analysis = runner.run::<AnalyzeHealthDataFlow>(&extracted).await?;

    Ok(ReportAnalysis {
        extracted,
        analysis,
    })
}
