use crate::generate::aggregator::ProviderResult;

const MERGE_PREAMBLE: &str = "Below are responses from different AI models to the same prompt. \
Please analyze these responses and provide either:\n\
1. The best single response if one clearly stands out, or\n\
2. A merged response that combines the unique insights and important points from all responses.\n\n";

/// A response that made it through the fan-out
#[derive(Debug, Clone, PartialEq)]
pub struct Success {
    pub provider: String,
    pub text: String,
}

impl Success {
    /// Keep the result if it succeeded
    pub fn from_result(result: &ProviderResult) -> Option<Self> {
        result.outcome.as_ref().ok().map(|text| Success {
            provider: result.provider.clone(),
            text: text.clone(),
        })
    }
}

/// Secondary request reconciling every successful response.
///
/// Never exists for an empty set of successes.
#[derive(Debug, Clone)]
pub struct MergeRequest {
    responses: Vec<Success>,
}

impl MergeRequest {
    pub fn new(responses: Vec<Success>) -> Option<Self> {
        if responses.is_empty() {
            None
        } else {
            Some(Self { responses })
        }
    }

    pub fn responses(&self) -> &[Success] {
        &self.responses
    }

    pub fn prompt(&self) -> String {
        let mut prompt = String::from(MERGE_PREAMBLE);
        for response in &self.responses {
            prompt.push_str(&format!(
                "=== {} Response ===\n{}\n\n",
                response.provider, response.text
            ));
        }
        prompt
    }
}
