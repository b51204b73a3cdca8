use tracing::{info, warn};

use crate::capabilities::CapabilityRegistry;
use crate::completion::ChatCompletionResponse;
use crate::error::QueryError;

/// Turns a completion response into the final answer.
///
/// Only the first choice is read. A call request is resolved against the
/// registry, its payload decoded and the capability's answer returned as-is;
/// otherwise the free-text content is returned verbatim, possibly empty.
pub fn dispatch(
    registry: &CapabilityRegistry,
    response: &ChatCompletionResponse,
) -> Result<String, QueryError> {
    let choice = response.choices.first().ok_or(QueryError::NoResponse)?;
    let message = &choice.message;

    let Some(call) = &message.function_call else {
        return Ok(message.content.clone());
    };

    let Some(handler) = registry.resolve(&call.capability_name) else {
        warn!(capability = %call.capability_name, "model requested unregistered capability");
        return Err(QueryError::UnregisteredCapability {
            name: call.capability_name.clone(),
        });
    };

    info!(capability = %call.capability_name, "dispatching capability call");
    handler
        .invoke(&call.arguments_json)
        .map_err(|source| QueryError::ArgumentDecode {
            raw: call.arguments_json.clone(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::dispatch;
    use crate::capabilities::{
        Capability, CapabilityDeclaration, CapabilityRegistry, CityArgs, UNKNOWN_CITY_WEATHER,
        city_schema,
    };
    use crate::completion::{ChatCompletionResponse, ResponseMessage};
    use crate::error::QueryError;
    use crate::model_gateway::testing::{call_response, response_with, text_response};

    struct CountingCapability {
        calls: Arc<AtomicUsize>,
    }

    impl Capability for CountingCapability {
        type Args = CityArgs;

        fn declaration(&self) -> CapabilityDeclaration {
            CapabilityDeclaration {
                name: "countCity".to_string(),
                description: "Counts invocations".to_string(),
                parameter_schema: city_schema(),
            }
        }

        fn call(&self, args: CityArgs) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            args.city
        }
    }

    fn counting_registry() -> (CapabilityRegistry, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = CapabilityRegistry::builtin();
        registry
            .register(Box::new(CountingCapability {
                calls: Arc::clone(&calls),
            }))
            .expect("name should be free");
        (registry, calls)
    }

    #[test]
    fn free_text_is_returned_verbatim() {
        let registry = CapabilityRegistry::builtin();
        let answer = dispatch(&registry, &text_response("Why did the crab cross the road?"))
            .expect("text should pass through");
        assert_eq!(answer, "Why did the crab cross the road?");
    }

    #[test]
    fn empty_content_is_returned_as_empty_string() {
        let registry = CapabilityRegistry::builtin();
        let answer = dispatch(&registry, &text_response("")).expect("empty text is an answer");
        assert_eq!(answer, "");
    }

    #[test]
    fn zero_choices_fail_with_no_response() {
        let registry = CapabilityRegistry::builtin();
        let err = dispatch(&registry, &ChatCompletionResponse::default())
            .expect_err("no choices should fail");
        assert!(matches!(err, QueryError::NoResponse));
        assert_eq!(err.to_string(), "no response");
    }

    #[test]
    fn only_first_choice_is_read() {
        let registry = CapabilityRegistry::builtin();
        let mut response = text_response("first");
        response.choices.extend(call_response("getWeather", r#"{"city":"Tokyo"}"#).choices);
        assert_eq!(dispatch(&registry, &response).expect("first wins"), "first");
    }

    #[test]
    fn weather_call_returns_table_value() {
        let registry = CapabilityRegistry::builtin();
        let answer = dispatch(&registry, &call_response("getWeather", r#"{"city":"Tokyo"}"#))
            .expect("call should succeed");
        assert_eq!(answer, "Cloudy, 22°C");
    }

    #[test]
    fn weather_call_for_unknown_city_returns_sentinel() {
        let registry = CapabilityRegistry::builtin();
        let answer = dispatch(&registry, &call_response("getWeather", r#"{"city":"Berlin"}"#))
            .expect("call should succeed");
        assert_eq!(answer, UNKNOWN_CITY_WEATHER);
    }

    #[test]
    fn call_ignores_accompanying_content() {
        let registry = CapabilityRegistry::builtin();
        let mut response = call_response("getTime", r#"{"city":"New York"}"#);
        response.choices[0].message.content = "Let me check.".to_string();
        assert_eq!(dispatch(&registry, &response).expect("call wins"), "14:30 PM");
    }

    #[test]
    fn unregistered_capability_fails_with_its_name_and_invokes_nothing() {
        let (registry, calls) = counting_registry();
        let err = dispatch(&registry, &call_response("getStockPrice", r#"{"city":"Tokyo"}"#))
            .expect_err("unknown capability should fail");

        match &err {
            QueryError::UnregisteredCapability { name } => assert_eq!(name, "getStockPrice"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("getStockPrice"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn malformed_arguments_fail_and_skip_the_handler() {
        let (registry, calls) = counting_registry();
        let err = dispatch(&registry, &call_response("countCity", r#"{"city":"Tok"#))
            .expect_err("malformed payload should fail");

        match &err {
            QueryError::ArgumentDecode { raw, .. } => assert_eq!(raw, r#"{"city":"Tok"#),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains(r#"city\":\"Tok"#), "message: {err}");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn non_object_arguments_fail_to_decode() {
        let (registry, calls) = counting_registry();
        for raw in ["", "[]", "\"Tokyo\""] {
            let err = dispatch(&registry, &call_response("countCity", raw))
                .expect_err("non-object payload should fail");
            assert!(matches!(err, QueryError::ArgumentDecode { .. }), "payload: {raw}");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn well_formed_call_invokes_handler_once() {
        let (registry, calls) = counting_registry();
        let answer = dispatch(&registry, &call_response("countCity", r#"{"city":"Oslo"}"#))
            .expect("call should succeed");
        assert_eq!(answer, "Oslo");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_message_fields_read_as_empty_text() {
        let registry = CapabilityRegistry::builtin();
        let answer = dispatch(&registry, &response_with(ResponseMessage::default()))
            .expect("empty message is an answer");
        assert_eq!(answer, "");
    }
}
