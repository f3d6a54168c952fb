use path_mapper::PathRecord;

#[derive(PathRecord, Debug, Clone, Default)]
struct Repository {
    owner: String,
    name: String,
}

#[derive(PathRecord, Debug, Clone, Default)]
struct PullRequest {
    #[path_mapper(embed)]
    repository: Option<Box<Repository>>,
    number: u64,
}

fn main() {
    let mut pull = PullRequest::default();
    path_mapper::map(
        "/{owner}/{name}/pull/{number}",
        "/rust-lang/cargo/pull/42",
        &mut pull,
    )
    .unwrap();
    println!("{pull:#?}");
}
