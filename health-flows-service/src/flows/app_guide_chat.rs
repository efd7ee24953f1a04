//! Help chatbot for the app's own features.
//!
//! Never fails once the question is valid: any generation problem turns
//! into a fixed apology.

use super::sanitize::{Repairs, CHATBOT_APOLOGY};
use super::{not_blank, schema, Flow, FlowError};
use crate::models::lenient;
use crate::services::providers::ProviderError;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AppGuideChatInput {
    #[validate(
        length(max = 2000, message = "Question is too long"),
        custom(function = "not_blank")
    )]
    pub user_query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub bot_response: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChatReply {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub bot_response: Option<String>,
}

pub struct AppGuideChatFlow;

impl AppGuideChatFlow {
    fn apology(repairs: &mut Repairs) -> ChatReply {
        repairs.note("chat_apology");
        ChatReply {
            bot_response: CHATBOT_APOLOGY.to_string(),
        }
    }
}

impl Flow for AppGuideChatFlow {
    const NAME: &'static str = "app_guide_chat";

    type Input = AppGuideChatInput;
    type Raw = RawChatReply;
    type Output = ChatReply;

    fn output_schema() -> serde_json::Value {
        schema::object(
            vec![(
                "botResponse",
                schema::string("Answer to the user's question about the app"),
            )],
            &["botResponse"],
            "Chatbot reply",
        )
    }

    fn sanitize(
        _input: &AppGuideChatInput,
        raw: RawChatReply,
        repairs: &mut Repairs,
    ) -> ChatReply {
        match raw.bot_response.filter(|r| !r.trim().is_empty()) {
            Some(text) => ChatReply {
                bot_response: text.trim().to_string(),
            },
            None => Self::apology(repairs),
        }
    }

    fn on_empty(
        _input: &AppGuideChatInput,
        repairs: &mut Repairs,
    ) -> Result<ChatReply, FlowError> {
        Ok(Self::apology(repairs))
    }

    fn on_provider_error(
        _input: &AppGuideChatInput,
        _err: ProviderError,
        repairs: &mut Repairs,
    ) -> Result<ChatReply, FlowError> {
        Ok(Self::apology(repairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> AppGuideChatInput {
        AppGuideChatInput {
            user_query: "How do I book an appointment?".to_string(),
        }
    }

    #[test]
    fn blank_answer_becomes_apology() {
        let mut repairs = Repairs::default();
        let reply = AppGuideChatFlow::sanitize(
            &input(),
            RawChatReply {
                bot_response: Some("   ".to_string()),
            },
            &mut repairs,
        );
        assert_eq!(reply.bot_response, CHATBOT_APOLOGY);
        assert_eq!(repairs.applied(), &["chat_apology"]);
    }

    #[test]
    fn failures_degrade_to_apology() {
        let mut repairs = Repairs::default();
        let reply = AppGuideChatFlow::on_provider_error(
            &input(),
            ProviderError::NetworkError("reset".to_string()),
            &mut repairs,
        )
        .unwrap();
        assert_eq!(reply.bot_response, CHATBOT_APOLOGY);

        let empty = AppGuideChatFlow::on_empty(&input(), &mut repairs).unwrap();
        assert_eq!(empty.bot_response, CHATBOT_APOLOGY);
    }

    #[test]
    fn answers_are_trimmed() {
        let reply = AppGuideChatFlow::sanitize(
            &input(),
            RawChatReply {
                bot_response: Some("  Open Find & Book.\n".to_string()),
            },
            &mut Repairs::default(),
        );
        assert_eq!(reply.bot_response, "Open Find & Book.");
    }
}
