//! Whole-operation preparation: resolution, harvesting, persistence across
//! runs and learning from execution.

mod common;

use restgen_core::{
    HttpMethod, Operation, ParamLocation, ParamType, Parameter, TestCase, TestCaseId, Verdict,
};
use restgen_semantic::{SemanticConfig, SemanticPipeline};

use common::{init_tracing, ScriptedKb};

const CITY: &str = "http://dbpedia.org/ontology/city";
const COUNTRY: &str = "http://dbpedia.org/ontology/country";

fn get_weather() -> Operation {
    Operation::new("getWeather", "/weather", HttpMethod::Get)
        .with_parameter(
            Parameter::new("city", ParamLocation::Query, ParamType::String)
                .required()
                .with_length(Some(1), Some(30)),
        )
        .with_parameter(Parameter::new("country", ParamLocation::Query, ParamType::String))
        .with_parameter(
            Parameter::new("units", ParamLocation::Query, ParamType::String)
                .with_enum(["metric", "imperial"]),
        )
        .with_parameter(Parameter::new("verbose", ParamLocation::Query, ParamType::Boolean))
}

fn scripted() -> ScriptedKb {
    ScriptedKb::new()
        .search("city", &[CITY])
        .support(CITY, 500)
        .values(CITY, &["Seville", "Rome"], &["Llanfairpwllgwyngyllgogerychwyrndrobwllllantysiliogogogoch"])
        .search("country", &[COUNTRY])
        .support(COUNTRY, 200)
        .values(COUNTRY, &["Spain", "Italy"], &[])
}

fn config(dir: &std::path::Path) -> SemanticConfig {
    SemanticConfig {
        store_dir: Some(dir.to_path_buf()),
        experiment: "weather".to_string(),
        ..SemanticConfig::default()
    }
}

#[tokio::test]
async fn prepares_only_free_form_parameters() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let pipeline = SemanticPipeline::new(scripted(), &config(dir.path()));

    let prepared = pipeline.prepare_operation(&get_weather()).await.unwrap();

    let names: Vec<&str> = prepared.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["city", "country"]);
    assert_eq!(prepared[0].index, 0);
    assert!(prepared[0].valid_values().contains("Seville"));
    assert_eq!(prepared[0].invalid_values().len(), 1);
    assert!(prepared[1].valid_values().contains("Italy"));
    // Unconstrained parameter: no complementary query.
    assert!(prepared[1].invalid_values().is_empty());
    for p in &prepared {
        assert!(p.valid_values().is_disjoint(p.invalid_values()));
    }
}

#[tokio::test]
async fn persisted_values_survive_an_unreachable_knowledge_base() {
    let dir = tempfile::tempdir().unwrap();
    let first = SemanticPipeline::new(scripted(), &config(dir.path()));
    first.prepare_operation(&get_weather()).await.unwrap();

    let second = SemanticPipeline::new(ScriptedKb::offline(), &config(dir.path()));
    let prepared = second.prepare_operation(&get_weather()).await.unwrap();

    assert!(prepared.iter().all(|p| !p.is_resolved()));
    assert!(prepared[0].valid_values().contains("Rome"));
    assert!(prepared[1].valid_values().contains("Spain"));
}

#[tokio::test]
async fn execution_feedback_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = SemanticPipeline::new(scripted(), &config(dir.path()));
    let op = get_weather();
    let mut prepared = pipeline.prepare_operation(&op).await.unwrap();

    let mut case = TestCase::template(TestCaseId::from_random_bytes([1; 16]), &op);
    case.add_parameter(&op.parameters[0], "Gotham");
    case.add_parameter(&op.parameters[1], "Spain");
    let learned = pipeline.record_execution(
        &mut prepared,
        &case,
        &Verdict::failure(Some(404), "city not found"),
    );
    assert_eq!(learned.invalid, 1);

    let stored = pipeline.store().unwrap().load("getWeather", "city");
    assert!(stored.invalid.contains("Gotham"));
    // Spain was already valid and stays so.
    let stored = pipeline.store().unwrap().load("getWeather", "country");
    assert!(stored.valid.contains("Spain"));
    assert!(!stored.invalid.contains("Spain"));
}

#[tokio::test]
async fn query_cache_deduplicates_identical_queries() {
    let dir = tempfile::tempdir().unwrap();
    let cached = SemanticConfig {
        cache_queries: true,
        ..config(dir.path())
    };
    let pipeline = SemanticPipeline::new(scripted(), &cached);
    let op = get_weather();

    pipeline.prepare_operation(&op).await.unwrap();
    let after_first = pipeline.knowledge_base().inner().log().len();
    pipeline.prepare_operation(&op).await.unwrap();

    assert_eq!(pipeline.knowledge_base().inner().log().len(), after_first);
    assert!(pipeline.knowledge_base().cached_queries() > 0);
}

#[test]
fn connects_to_the_configured_endpoint() {
    let config = SemanticConfig {
        store_dir: None,
        ..SemanticConfig::default()
    };
    let pipeline = SemanticPipeline::connect(&config).unwrap();
    assert_eq!(pipeline.knowledge_base().inner().url(), config.endpoint);
    assert!(pipeline.store().is_none());
}
