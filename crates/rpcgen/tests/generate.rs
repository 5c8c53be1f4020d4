use rpcgen::validate::synthesize;
use rpcgen::{
    GenerateError, GenerateOptions, LoadError, Schema, backends, get_backend,
    resolve::Resolver,
};
use serde_json::json;

fn fixture(name: &str) -> Schema {
    let input = match name {
        "user" => include_str!("fixtures/user.json"),
        "todo" => include_str!("fixtures/todo.json"),
        "unresolved" => include_str!("fixtures/unresolved.json"),
        other => panic!("unknown fixture {other}"),
    };
    Schema::from_json(input).unwrap()
}

fn generate(backend: &str, schema: &Schema) -> String {
    get_backend(backend)
        .unwrap()
        .generate(schema, &GenerateOptions::default())
        .unwrap()
}

#[test]
fn every_backend_is_idempotent() {
    let schema = fixture("todo");
    for backend in backends() {
        let options = GenerateOptions::default();
        let first = backend.generate(&schema, &options).unwrap();
        let second = backend.generate(&schema, &options).unwrap();
        assert_eq!(first, second, "{} output differs between runs", backend.name());
        assert!(first.contains("Do not edit, this file was generated by rpcgen."));
        assert!(first.ends_with('\n') && !first.ends_with("\n\n"));
    }
}

#[test]
fn user_scenario_rust_client() {
    let out = generate("rust-client", &fixture("user"));
    assert!(out.contains("pub struct User {"));
    assert!(out.contains("pub struct GetUserInput {"));
    assert!(out.contains("pub struct GetUserOutput {"));
    assert!(out.contains("    pub user: User,"));
    assert!(out.contains("    pub tags: Option<Vec<String>>,"));
    assert!(out.contains("    /// Returns a user by id.\n    pub async fn get_user(&self, input: &GetUserInput)"));
}

#[test]
fn user_scenario_go_types() {
    let options = GenerateOptions {
        validate: false,
        ..Default::default()
    };
    let out = get_backend("go-types")
        .unwrap()
        .generate(&fixture("user"), &options)
        .unwrap();
    insta::assert_snapshot!(out, @r#"
    // Do not edit, this file was generated by rpcgen.

    package api

    // User is a registered user.
    type User struct {
    	// Id is the user id.
    	Id int64 `json:"id"`

    	// Tags is labels attached to the user.
    	Tags []string `json:"tags"`
    }

    // GetUserInput params.
    type GetUserInput struct {
    	// Id is the user id.
    	Id int64 `json:"id"`
    }

    // GetUserOutput params.
    type GetUserOutput struct {
    	// User is the user.
    	User User `json:"user"`
    }
    "#);
}

#[test]
fn todo_go_types() {
    let out = generate("go-types", &fixture("todo"));
    assert!(out.contains("package todo\n\nimport (\n\t\"fmt\"\n\t\"time\"\n)\n"));
    assert!(out.contains("\tStatus *string `json:\"status\" yaml:\"status\"`"));
    assert!(out.contains("\tCreatedAt *time.Time `json:\"created_at\" yaml:\"created_at\"`"));
    assert!(out.contains("\tMeta map[string]interface{} `json:\"meta\" yaml:\"meta\"`"));
    assert!(out.contains("\tChildren []Item `json:\"children\" yaml:\"children\"`"));
    assert!(out.contains("func (a *AddItemInput) Validate() error {\n\treturn nil\n}"));
    assert!(out.contains("func (r *RemoveItemInput) Validate() error {\n\tif r.Id == 0 {"));
    assert!(out.contains("type GetItemsOutput struct {"));
    assert!(!out.contains("func (g *GetItemsOutput)"));
    assert!(out.contains("func oneOf(s string, values []string) bool {"));
}

#[test]
fn todo_rust_types() {
    let out = generate("rust-types", &fixture("todo"));
    assert!(out.contains("use std::collections::HashMap;\n\nuse chrono::{DateTime, Utc};\nuse serde::{Deserialize, Serialize};"));
    assert!(out.contains("    pub created_at: Option<DateTime<Utc>>,"));
    assert!(out.contains("    pub meta: Option<HashMap<String, serde_json::Value>>,"));
    assert!(out.contains("    pub children: Option<Vec<Item>>,"));
    assert!(out.contains("impl AddItemInput {"));
    assert!(!out.contains("impl GetItemsOutput {"));
    assert!(out.contains("pub enum ValidationError {"));
}

#[test]
fn todo_typescript_client() {
    let out = generate("typescript-client", &fixture("todo"));
    assert!(out.contains("  created_at?: Date\n"));
    assert!(out.contains("  meta?: Record<string, any>\n"));
    assert!(out.contains("  items: Item[]\n"));
    assert!(out.contains("  async addItem(params: AddItemInput): Promise<void> {\n    await this.call(\"add_item\", params)\n  }"));
    assert!(out.contains("  async getItems(): Promise<GetItemsOutput> {\n    return JSON.parse(await this.call(\"get_items\"))\n  }"));
}

#[test]
fn todo_ruby_client() {
    let out = generate("ruby-client", &fixture("todo"));
    assert!(out.contains("module Api\n  class Client\n"));
    assert!(out.contains("    # @option params [Item] :item item.\n"));
    assert!(out.contains("    def get_items\n      call \"get_items\"\n    end\n"));
    assert!(out.contains("    # Calls `remove_item`.\n"));
    assert!(!out.contains("struct"));
}

#[test]
fn unresolved_reference_aborts_every_backend() {
    let schema = fixture("unresolved");
    for backend in backends() {
        let err = backend
            .generate(&schema, &GenerateOptions::default())
            .unwrap_err();
        assert_eq!(
            err,
            GenerateError::UnresolvedReference {
                field: "team.members".into(),
                target: "member".into(),
            }
        );
        assert_eq!(
            err.to_string(),
            "field `team.members` references unknown type `member`"
        );
    }
}

#[test]
fn unknown_type_keyword_is_unhandled() {
    let schema = Schema::from_value(json!({
        "types": [
            { "name": "price", "properties": [ { "name": "amount", "type": "decimal" } ] }
        ]
    }))
    .unwrap();
    let err = get_backend("rust-types")
        .unwrap()
        .generate(&schema, &GenerateOptions::default())
        .unwrap_err();
    assert!(matches!(err, GenerateError::UnhandledType { ref ty, .. } if ty == "decimal"));
}

#[test]
fn duplicate_types_are_rejected_at_load() {
    let err = Schema::from_value(json!({
        "types": [ { "name": "user" }, { "name": "user" } ]
    }))
    .unwrap_err();
    assert!(matches!(err, LoadError::DuplicateType(name) if name == "user"));
}

#[test]
fn validation_round_trip_over_fixture() {
    let schema = fixture("todo");
    let resolver = Resolver::new(&schema);
    let item = schema.get_type("item").unwrap();
    let validation = synthesize(&item.name, &item.properties).unwrap();

    // id, title, status (default + enum), children
    assert_eq!(validation.len(), 4);
    assert!(validation.has_defaults());

    let mut ok = json!({ "id": 1, "title": "write tests" });
    assert_eq!(validation.check(&resolver, &mut ok).unwrap(), Ok(()));
    assert_eq!(ok["status"], "open");

    let mut bad_status = json!({ "id": 1, "title": "x", "status": "later" });
    let failure = validation.check(&resolver, &mut bad_status).unwrap().unwrap_err();
    assert_eq!(
        failure.to_string(),
        r#"Field: status, Message: must be one of: "open", "done""#
    );

    let mut bad_child = json!({
        "id": 1,
        "title": "parent",
        "children": [ { "id": 2, "title": "child" }, { "id": 3, "title": "" } ]
    });
    let failure = validation.check(&resolver, &mut bad_child).unwrap().unwrap_err();
    assert_eq!(failure.to_string(), "element 1: Field: title, Message: is required");
}
