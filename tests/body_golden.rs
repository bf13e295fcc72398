use hcledit::{Body, File, Item, Traversal, Value};
use std::fs;
use std::path::PathBuf;

fn load_fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("failed to load fixture {name}: {err}"))
}

fn traversal(input: &str) -> Traversal {
    Traversal::parse(input).expect("traversal")
}

#[test]
fn fixture_roundtrips_unmodified() {
    let input = load_fixture("main.tf.input");
    let file = File::parse(&input).expect("parse");
    assert_eq!(file.to_string(), input);
}

#[test]
fn edits_match_golden_output() {
    let input = load_fixture("main.tf.input");
    let expected = load_fixture("main.tf.expected");
    let mut file = File::parse(&input).expect("parse");

    let web = file
        .body_mut()
        .first_matching_block_mut("resource", &["aws_instance", "web"])
        .expect("web instance")
        .body_mut();
    web.set_attribute_value("count", 3);
    web.set_attribute_traversal("ami", &traversal("var.ami"));
    web.set_attribute_value("monitoring", true);

    file.body_mut()
        .first_matching_block_mut("variable", &["ami"])
        .expect("ami variable")
        .body_mut()
        .remove_attribute("type")
        .expect("type attribute");

    file.body_mut()
        .append_block("output", ["web_ip"], true)
        .body_mut()
        .set_attribute_traversal("value", &traversal("aws_instance.web.public_ip"));

    assert_eq!(file.to_string(), expected);
}

#[test]
fn repeated_upserts_are_idempotent_on_parsed_input() {
    let input = load_fixture("main.tf.input");
    let mut file = File::parse(&input).expect("parse");
    let web = file
        .body_mut()
        .first_matching_block_mut("resource", &["aws_instance", "web"])
        .expect("web instance")
        .body_mut();

    web.set_attribute_value("count", 1);
    web.set_attribute_value("instance_type", "t3.micro");
    assert_eq!(file.to_string(), input);
}

#[test]
fn parsed_values_are_recovered() {
    let input = load_fixture("main.tf.input");
    let file = File::parse(&input).expect("parse");
    let web = file
        .body()
        .first_matching_block("resource", &["aws_instance", "web"])
        .expect("web instance")
        .body();

    assert_eq!(
        web.get_attribute("count").unwrap().expr().as_literal(),
        Some(&Value::Int(1))
    );
    let tags = web.get_attribute("tags").unwrap().expr().as_literal().cloned();
    let mut expected = std::collections::BTreeMap::new();
    expected.insert("Name".to_string(), Value::from("web"));
    assert_eq!(tags, Some(Value::Object(expected)));

    let names: Vec<String> = web
        .items()
        .map(|(_, item)| match item {
            Item::Attribute(attr) => attr.name(),
            Item::Block(block) => block.type_name(),
        })
        .collect();
    assert_eq!(names, vec!["ami", "instance_type", "count", "tags"]);
}

#[test]
fn building_a_document_from_scratch() {
    let mut body = Body::new();
    body.set_attribute_value("region", "us-east-1");
    let provider = body.append_block("provider", ["aws"], true);
    provider.body_mut().set_attribute_traversal("region", &traversal("var.region"));
    provider
        .body_mut()
        .set_attribute_value("allowed_account_ids", vec!["123", "456"]);

    assert_eq!(
        String::from_utf8(body.to_bytes()).unwrap(),
        "region = \"us-east-1\"\n\nprovider \"aws\" {\n  region = var.region\n  allowed_account_ids = [\"123\", \"456\"]\n}\n"
    );
}

#[test]
fn tab_indented_bodies_keep_their_indent() {
    let input = "locals {\n\tname = \"a\"\n}\n";
    let mut file = File::parse(input).expect("parse");
    file.body_mut()
        .first_matching_block_mut("locals", &[] as &[&str])
        .unwrap()
        .body_mut()
        .set_attribute_value("size", 2);
    assert_eq!(file.to_string(), "locals {\n\tname = \"a\"\n\tsize = 2\n}\n");
}
