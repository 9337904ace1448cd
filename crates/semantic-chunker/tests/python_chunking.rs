use context_semantic_chunker::{
    ChunkKind, ChunkRecord, Chunker, ChunkerConfig, Decorator, DecoratorTag, StatementPolicy,
};
use pretty_assertions::assert_eq;

const INVENTORY: &str = include_str!("fixtures/inventory.py");

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn chunk_with(config: ChunkerConfig, code: &str) -> Vec<ChunkRecord> {
    init_logging();
    Chunker::new(config)
        .expect("valid config")
        .chunk_str(code, Some("sample.py"))
        .expect("chunking failed")
}

fn chunk(code: &str) -> Vec<ChunkRecord> {
    chunk_with(ChunkerConfig::default(), code)
}

fn find<'a>(records: &'a [ChunkRecord], name: &str) -> &'a ChunkRecord {
    records
        .iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| panic!("no chunk named {name}"))
}

fn children_of<'a>(records: &'a [ChunkRecord], parent: &ChunkRecord) -> Vec<&'a ChunkRecord> {
    records
        .iter()
        .filter(|r| r.parent_id.as_deref() == Some(parent.id.as_str()))
        .collect()
}

fn tags(tags: &[DecoratorTag]) -> Vec<Decorator> {
    tags.iter().copied().map(Decorator::Tag).collect()
}

#[test]
fn class_with_four_method_styles() {
    let code = r#"class Meter:
    def read(self):
        return self.value

    @property
    def unit(self):
        return "kWh"

    @staticmethod
    def parse(raw):
        return float(raw)

    @classmethod
    def zero(cls):
        return cls()
"#;
    let records = chunk(code);
    let class = find(&records, "Meter");
    assert_eq!(class.kind, ChunkKind::Class);

    let members = children_of(&records, class);
    let summary: Vec<(&str, ChunkKind, Vec<Decorator>)> = members
        .iter()
        .map(|r| (r.name.as_str(), r.kind, r.decorators.clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("read", ChunkKind::Method, vec![]),
            ("unit", ChunkKind::Property, tags(&[DecoratorTag::Property])),
            ("parse", ChunkKind::StaticMethod, tags(&[DecoratorTag::Static])),
            ("zero", ChunkKind::ClassMethod, tags(&[DecoratorTag::ClassScoped])),
        ]
    );
    for member in members {
        assert_eq!(member.depth, 1);
    }
}

#[test]
fn decorators_are_inside_the_chunk_span() {
    let code = r#"import functools

@functools.lru_cache(maxsize=8)
@trace
def cached(n):
    return n
"#;
    let records = chunk(code);
    let cached = find(&records, "cached");
    let text = &code[cached.span.start_byte..cached.span.end_byte];
    assert!(text.starts_with("@functools.lru_cache"), "span text was {text:?}");
    assert_eq!(cached.span.start_line, 3);
    assert_eq!(
        cached.decorators,
        vec![
            Decorator::Other("@functools.lru_cache(maxsize=8)".to_string()),
            Decorator::Other("@trace".to_string()),
        ]
    );
}

#[test]
fn generator_async_and_async_generator() {
    let code = r#"def numbers():
    yield 1

async def fetch():
    return 1

async def ticks():
    while True:
        yield 1
"#;
    let records = chunk(code);

    let numbers = find(&records, "numbers");
    assert_eq!(numbers.kind, ChunkKind::Generator);
    assert_eq!(numbers.decorators, tags(&[DecoratorTag::Generator]));

    let fetch = find(&records, "fetch");
    assert_eq!(fetch.kind, ChunkKind::AsyncFunction);
    assert_eq!(fetch.decorators, tags(&[DecoratorTag::Asynchronous]));

    let ticks = find(&records, "ticks");
    assert_eq!(ticks.kind, ChunkKind::AsyncFunction);
    assert_eq!(
        ticks.decorators,
        tags(&[DecoratorTag::Asynchronous, DecoratorTag::Generator])
    );
}

#[test]
fn inner_function_nests_under_outer() {
    let code = "def outer(x):\n    def inner(y):\n        return x + y\n    return inner\n";
    let records = chunk(code);
    let outer = find(&records, "outer");
    let inner = find(&records, "inner");

    assert_eq!(outer.depth, 0);
    assert_eq!(outer.parent_id, None);
    assert_eq!(inner.depth, 1);
    assert_eq!(inner.parent_id.as_deref(), Some(outer.id.as_str()));
    assert_eq!(inner.kind, ChunkKind::Function);
    assert!(
        outer.span.start_byte <= inner.span.start_byte
            && inner.span.end_byte <= outer.span.end_byte
    );
}

#[test]
fn inventory_fixture_metadata() {
    let records = chunk_with(ChunkerConfig::default(), INVENTORY);

    let load = find(&records, "load_items");
    assert_eq!(load.kind, ChunkKind::Function);
    assert_eq!(load.signature, "(path: str) -> list");
    assert_eq!(load.docstring, "Read items from a JSON file.");

    assert_eq!(find(&records, "refresh").kind, ChunkKind::AsyncFunction);
    let watch = find(&records, "watch");
    assert_eq!(watch.kind, ChunkKind::AsyncFunction);
    assert!(watch.decorators.contains(&Decorator::Tag(DecoratorTag::Generator)));

    let warehouse = find(&records, "Warehouse");
    assert_eq!(warehouse.extends, vec!["Store".to_string()]);
    assert_eq!(warehouse.docstring, "A store that tracks stock levels.");
    let kinds: Vec<ChunkKind> = children_of(&records, warehouse).iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ChunkKind::Method,
            ChunkKind::Property,
            ChunkKind::StaticMethod,
            ChunkKind::ClassMethod,
        ]
    );

    let item = find(&records, "Item");
    assert_eq!(item.kind, ChunkKind::DataHolder);
    assert_eq!(item.decorators, tags(&[DecoratorTag::DataHolder]));

    assert_eq!(find(&records, "paginate").kind, ChunkKind::Generator);

    let double = find(&records, "double");
    assert_eq!(double.kind, ChunkKind::Lambda);
    assert_eq!(double.signature, "(n)");
    assert!(!double.synthetic);

    let counter = find(&records, "make_counter");
    let increment = find(&records, "increment");
    assert_eq!(increment.parent_id.as_deref(), Some(counter.id.as_str()));
    assert_eq!(increment.signature, "(step: int = 1) -> int");
    assert_eq!(increment.docstring, "Advance the counter.");

    let main = find(&records, "__main__");
    assert_eq!(main.kind, ChunkKind::Module);
    assert_eq!(main.span.end_byte, INVENTORY.len());
}

#[test]
fn folded_statements_become_gap_content() {
    let config = ChunkerConfig {
        guarded_blocks: StatementPolicy::Fold,
        lambda_assignments: StatementPolicy::Fold,
        ..ChunkerConfig::default()
    };
    let records = chunk_with(config, INVENTORY);
    assert!(records.iter().all(|r| r.name != "__main__" && r.name != "double"));
}

#[test]
fn anonymous_literals_are_opt_in() {
    let code = "def sort_items(items):\n    return sorted(items, key=lambda item: item.rank)\n";

    let records = chunk(code);
    assert!(records.iter().all(|r| r.kind != ChunkKind::Lambda));

    let config = ChunkerConfig {
        chunk_anonymous_literals: true,
        ..ChunkerConfig::default()
    };
    let records = chunk_with(config, code);
    let literal = records
        .iter()
        .find(|r| r.kind == ChunkKind::Lambda)
        .expect("lambda chunk");
    assert_eq!(literal.name, "<anonymous@2:30>");
    assert_eq!(literal.signature, "(item)");
    assert_eq!(literal.depth, 1);
    assert!(!literal.synthetic);
}

#[test]
fn small_leading_statements_form_a_preamble() {
    let code = "import os\nimport sys\n\n\ndef main():\n    return os.getcwd()\n";
    let records = chunk(code);
    let preamble = &records[0];
    assert_eq!(preamble.name, "<preamble>");
    assert_eq!(preamble.kind, ChunkKind::Module);
    assert!(preamble.synthetic);
    assert_eq!(preamble.span.start_byte, 0);
    assert_eq!(records[1].name, "main");
    assert_eq!(records[1].span.start_byte, preamble.span.end_byte);
}

#[test]
fn configured_decorator_rules_take_precedence() {
    let config = ChunkerConfig::from_toml_str(
        r#"
[[decorator_rules]]
pattern = "^pydantic_model$"
tag = "data_holder"

[[decorator_rules]]
pattern = "^property$"
tag = "static"
"#,
    )
    .expect("valid config");
    let code = r#"@pydantic_model
class User:
    @property
    def name(self):
        return 'x'
"#;
    let records = chunk_with(config, code);
    assert_eq!(find(&records, "User").kind, ChunkKind::DataHolder);
    assert_eq!(find(&records, "name").kind, ChunkKind::StaticMethod);
}
