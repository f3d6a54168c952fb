use path_mapper::PathRecord;

#[derive(PathRecord, Debug, Clone, Default)]
struct Issue {
    owner: String,
    repository: String,
    number: u32,
    label: Option<String>,
}

fn main() {
    let pattern = "/{owner}/{repository}/issues/{number}";

    for path in [
        "/rust-lang/rust/issues/1",
        "/rust-lang/rust/pulls/1",
        "/rust-lang/rust/issues/one",
        "/rust-lang/issues/1",
    ] {
        let mut issue = Issue::default();
        match path_mapper::map(pattern, path, &mut issue) {
            Ok(()) => println!("{path} -> {issue:?}"),
            Err(e) => println!("{path} -> error: {e}"),
        }
    }
}
