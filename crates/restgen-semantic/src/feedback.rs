//! Learning from execution outcomes.
//!
//! A value the API accepted is valid. A value sent in a request the API
//! rejected as a client error (4xx) is invalid, unless it is already known
//! valid. Other outcomes (5xx, transport errors) say nothing about the
//! input and are ignored.

use restgen_core::{SemanticParameter, TestCase, Verdict};

/// Values learned from one execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Learned {
    pub valid: usize,
    pub invalid: usize,
}

impl Learned {
    pub fn is_empty(&self) -> bool {
        self.valid == 0 && self.invalid == 0
    }
}

/// Updates `parameters` from the outcome of `case`.
///
/// `parameters` must belong to the operation `case` was built for.
pub fn learn_from_execution(
    parameters: &mut [SemanticParameter],
    case: &TestCase,
    verdict: &Verdict,
) -> Learned {
    let mut learned = Learned::default();
    let accepted = verdict.is_success();
    let rejected = verdict.is_client_error();
    if !accepted && !rejected {
        return learned;
    }

    for parameter in parameters.iter_mut() {
        let Some(value) = case.value(parameter.name(), parameter.location()) else {
            continue;
        };
        if accepted {
            if !parameter.valid_values().contains(value) {
                parameter.add_valid([value.to_string()]);
                learned.valid += 1;
            }
        } else if !parameter.valid_values().contains(value)
            && !parameter.invalid_values().contains(value)
        {
            parameter.add_invalid([value.to_string()]);
            learned.invalid += 1;
        }
    }
    learned
}

#[cfg(test)]
mod tests {
    use super::*;
    use restgen_core::{HttpMethod, Operation, ParamLocation, ParamType, Parameter, TestCaseId};

    fn setup() -> (Operation, Vec<SemanticParameter>) {
        let op = Operation::new("getWeather", "/weather", HttpMethod::Get)
            .with_parameter(Parameter::new("city", ParamLocation::Query, ParamType::String));
        let city = SemanticParameter::new(0, op.parameters[0].clone());
        (op, vec![city])
    }

    fn case(op: &Operation, city: &str) -> TestCase {
        let mut tc = TestCase::template(TestCaseId::from_random_bytes([7; 16]), op);
        tc.add_parameter(&op.parameters[0], city);
        tc
    }

    #[test]
    fn success_learns_valid_and_evicts_invalid() {
        let (op, mut params) = setup();
        params[0].add_invalid(["Seville".to_string()]);

        let learned = learn_from_execution(&mut params, &case(&op, "Seville"), &Verdict::success(200));
        assert_eq!(learned, Learned { valid: 1, invalid: 0 });
        assert!(params[0].valid_values().contains("Seville"));
        assert!(params[0].invalid_values().is_empty());
    }

    #[test]
    fn client_errors_learn_invalid_unless_known_valid() {
        let (op, mut params) = setup();
        params[0].add_valid(["Seville".to_string()]);

        let rejected = Verdict::failure(Some(400), "bad city");
        learn_from_execution(&mut params, &case(&op, "Gotham"), &rejected);
        learn_from_execution(&mut params, &case(&op, "Seville"), &rejected);

        assert!(params[0].invalid_values().contains("Gotham"));
        assert!(!params[0].invalid_values().contains("Seville"));
    }

    #[test]
    fn server_errors_teach_nothing() {
        let (op, mut params) = setup();
        let learned = learn_from_execution(
            &mut params,
            &case(&op, "Gotham"),
            &Verdict::failure(Some(500), "boom"),
        );
        assert!(learned.is_empty());
        assert!(!params[0].has_values());
    }
}
