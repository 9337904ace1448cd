use context_semantic_chunker::{ChunkKind, ChunkRecord, Chunker, Decorator, DecoratorTag};
use pretty_assertions::assert_eq;

const GEOMETRY: &str = include_str!("fixtures/geometry.rs");
const WIDGETS: &str = include_str!("fixtures/widgets.ts");
const SERVER: &str = include_str!("fixtures/server.go");

fn chunk(code: &str, path: &str) -> Vec<ChunkRecord> {
    Chunker::default()
        .chunk_str(code, Some(path))
        .expect("chunking failed")
}

fn named<'a>(records: &'a [ChunkRecord], name: &str) -> Vec<&'a ChunkRecord> {
    records.iter().filter(|r| r.name == name).collect()
}

fn children_of<'a>(records: &'a [ChunkRecord], parent: &ChunkRecord) -> Vec<&'a ChunkRecord> {
    records
        .iter()
        .filter(|r| r.parent_id.as_deref() == Some(parent.id.as_str()))
        .collect()
}

#[test]
fn rust_structs_impls_and_traits() {
    let records = chunk(GEOMETRY, "geometry.rs");
    let vec2 = named(&records, "Vec2");
    // struct + three impl blocks
    assert_eq!(vec2.len(), 4);

    let strukt = vec2[0];
    assert_eq!(strukt.kind, ChunkKind::Class);
    assert_eq!(strukt.docstring, "A point in the plane.");
    assert_eq!(
        strukt.decorators,
        vec![Decorator::Other("#[derive(Debug, Clone, Copy, PartialEq)]".to_string())]
    );

    let inherent = vec2[1];
    let methods: Vec<(&str, ChunkKind)> = children_of(&records, inherent)
        .iter()
        .map(|r| (r.name.as_str(), r.kind))
        .collect();
    assert_eq!(methods, vec![("new", ChunkKind::Method), ("length", ChunkKind::Method)]);

    assert_eq!(vec2[2].extends, vec!["Add".to_string()]);
    assert_eq!(vec2[3].extends, vec!["Display".to_string()]);
    let fmt = children_of(&records, vec2[3]);
    assert_eq!(fmt[0].signature, "(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result");

    let shape = named(&records, "Shape")[0];
    assert_eq!(shape.extends, vec!["Debug".to_string()]);
    let required: Vec<&str> = children_of(&records, shape)
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(required, vec!["area", "name"]);
}

#[test]
fn rust_functions_and_modules() {
    let records = chunk(GEOMETRY, "geometry.rs");

    let total = named(&records, "total_area")[0];
    assert_eq!(total.kind, ChunkKind::Function);
    assert_eq!(total.signature, "(shapes: &[Box<dyn Shape>]) -> f64");
    assert!(children_of(&records, total).is_empty());

    let resolve = named(&records, "resolve")[0];
    assert_eq!(resolve.kind, ChunkKind::AsyncFunction);
    assert_eq!(resolve.decorators, vec![Decorator::Tag(DecoratorTag::Asynchronous)]);

    let units = named(&records, "units")[0];
    assert_eq!(units.kind, ChunkKind::Module);
    let convert = children_of(&records, units);
    assert_eq!(convert.len(), 1);
    assert_eq!(convert[0].name, "to_radians");
    assert_eq!(convert[0].kind, ChunkKind::Function);
    assert_eq!(convert[0].depth, 1);
}

#[test]
fn typescript_classes_and_members() {
    let records = chunk(WIDGETS, "widgets.ts");

    assert_eq!(named(&records, "Widget")[0].kind, ChunkKind::Class);
    assert_eq!(named(&records, "Size")[0].kind, ChunkKind::Class);

    let base = named(&records, "BaseWidget")[0];
    assert_eq!(base.docstring, "Base class for all widgets.");
    assert_eq!(base.extends, vec!["Widget".to_string()]);
    assert!(WIDGETS[base.span.start_byte..].starts_with("/** Base class"));

    let members: Vec<(&str, ChunkKind)> = children_of(&records, base)
        .iter()
        .map(|r| (r.name.as_str(), r.kind))
        .collect();
    assert_eq!(
        members,
        vec![
            ("constructor", ChunkKind::Method),
            ("create", ChunkKind::StaticMethod),
            ("label", ChunkKind::Property),
        ]
    );

    let label = named(&records, "Label")[0];
    assert_eq!(label.extends, vec!["BaseWidget".to_string()]);
    let render = children_of(&records, label)
        .into_iter()
        .find(|r| r.name == "render")
        .expect("render method");
    assert_eq!(render.signature, "() -> string");
}

#[test]
fn typescript_functions_and_arrow_assignments() {
    let records = chunk(WIDGETS, "widgets.ts");

    let ids = named(&records, "ids")[0];
    assert_eq!(ids.kind, ChunkKind::Generator);
    assert_eq!(ids.signature, "(prefix: string) -> Generator<string>");

    let load = named(&records, "loadAll")[0];
    assert_eq!(load.kind, ChunkKind::AsyncFunction);
    assert!(children_of(&records, load).is_empty());

    let format = named(&records, "format")[0];
    assert_eq!(format.kind, ChunkKind::Lambda);
    assert_eq!(format.signature, "(w: Widget) -> string");
    assert_eq!(format.parent_id, None);
}

#[test]
fn javascript_uses_its_own_grammar() {
    let code = r#"/** Adds. */
export function add(a, b) {
  return a + b;
}

const twice = x => x * 2;
"#;
    let records = chunk(code, "math.mjs");
    let add = named(&records, "add")[0];
    assert_eq!(add.language, "javascript");
    assert_eq!(add.docstring, "Adds.");
    assert_eq!(add.signature, "(a, b)");

    let twice = named(&records, "twice")[0];
    assert_eq!(twice.kind, ChunkKind::Lambda);
    assert_eq!(twice.signature, "(x)");
}

#[test]
fn doc_comments_attach_to_arrow_assignments() {
    for code in [
        "function a() {}\n\n/** Adds numbers. */\nconst add = (x, y) => x + y;\n",
        "function a() {}\n\n/** Adds numbers. */\nexport const add = (x, y) => x + y;\n",
    ] {
        let records = chunk(code, "math.js");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text(code), "function a() {}\n\n");

        let add = &records[1];
        assert_eq!(add.name, "add");
        assert_eq!(add.kind, ChunkKind::Lambda);
        assert_eq!(add.docstring, "Adds numbers.");
        assert!(add.text(code).starts_with("/** Adds numbers. */"));
    }
}

#[test]
fn rust_attributes_stay_with_their_item() {
    let code = "fn a() {}\n\n/// The limit.\n#[allow(dead_code)]\nconst X: i32 = 1;\n";
    let records = chunk(code, "limits.rs");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].text(code), "fn a() {}\n\n");
    assert_eq!(records[1].name, "<gap@3:1>");
    assert_eq!(
        records[1].text(code),
        "/// The limit.\n#[allow(dead_code)]\nconst X: i32 = 1;\n"
    );
}

#[test]
fn typescript_decorators_are_kept() {
    let code = r#"@Component({ selector: "app-root" })
export class AppRoot {
  @HostListener("click")
  onClick(event: Event): void {
    this.count += 1;
  }

  @memoize
  static create(): AppRoot {
    return new AppRoot();
  }
}
"#;
    let records = chunk(code, "app.ts");

    let app = named(&records, "AppRoot")[0];
    assert_eq!(
        app.decorators,
        vec![Decorator::Other(r#"@Component({ selector: "app-root" })"#.to_string())]
    );

    let on_click = named(&records, "onClick")[0];
    assert_eq!(on_click.kind, ChunkKind::Method);
    assert_eq!(on_click.parent_id.as_deref(), Some(app.id.as_str()));
    assert_eq!(
        on_click.decorators,
        vec![Decorator::Other(r#"@HostListener("click")"#.to_string())]
    );
    assert!(on_click.text(code).starts_with("@HostListener"));
    assert_eq!(on_click.signature, "(event: Event) -> void");

    let create = named(&records, "create")[0];
    assert_eq!(create.kind, ChunkKind::StaticMethod);
    assert_eq!(
        create.decorators,
        vec![
            Decorator::Other("@memoize".to_string()),
            Decorator::Tag(DecoratorTag::Static),
        ]
    );
}

#[test]
fn go_types_functions_and_methods() {
    let records = chunk(SERVER, "server.go");
    let top: Vec<(&str, ChunkKind)> = records
        .iter()
        .filter(|r| r.parent_id.is_none())
        .map(|r| (r.name.as_str(), r.kind))
        .collect();
    assert_eq!(
        top,
        vec![
            ("<preamble>", ChunkKind::Module),
            ("Store", ChunkKind::Class),
            ("Server", ChunkKind::Class),
            ("New", ChunkKind::Function),
            ("ServeHTTP", ChunkKind::Function),
            ("logRequest", ChunkKind::Lambda),
        ]
    );

    let store = named(&records, "Store")[0];
    assert_eq!(store.docstring, "Store persists request counts.");
    assert!(store.text(SERVER).starts_with("// Store persists"));

    let server = named(&records, "Server")[0];
    assert_eq!(server.extends, vec!["Handler".to_string()]);

    let new = named(&records, "New")[0];
    assert_eq!(new.signature, "(store Store) -> *Server");

    let serve = named(&records, "ServeHTTP")[0];
    assert_eq!(serve.extends, vec!["Server".to_string()]);
    assert_eq!(serve.docstring, "ServeHTTP counts every request.");
    assert_eq!(serve.signature, "(w http.ResponseWriter, r *http.Request)");

    let log = named(&records, "logRequest")[0];
    assert_eq!(log.signature, "(r *http.Request)");
}

#[test]
fn file_imports_are_copied_to_every_record() {
    let records = chunk(SERVER, "server.go");
    let imports: Vec<String> = ["context", "net/http", "strconv", "time"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for record in &records {
        assert_eq!(record.package.as_deref(), Some("server"));
        assert_eq!(record.imports, imports);
    }

    let records = chunk(GEOMETRY, "geometry.rs");
    assert!(records.iter().all(|r| r.package.is_none()));
    assert!(!records[0].imports.is_empty());

    let code = r#"import os
from collections import abc
import numpy as np, json

def f():
    pass
"#;
    let records = chunk(code, "deps.py");
    assert_eq!(records[0].imports, vec!["os", "collections", "numpy", "json"]);

    let code = r#"import { render } from "./dom";
import "./styles.css";

export function main() {}
"#;
    let records = chunk(code, "main.ts");
    assert_eq!(records[0].imports, vec!["./dom", "./styles.css"]);
}
