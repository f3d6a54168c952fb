use path_mapper::{ConverterRegistry, Mapper, PathRecord, TypedValue};

#[derive(PathRecord, Debug, Clone, Default)]
struct Release {
    project: String,
    #[path_mapper(alias = "version")]
    major: u16,
    tag: String,
}

fn main() {
    let mut converters = ConverterRegistry::new();
    // `v1.2.3` -> 1
    converters.register("version", |v| {
        let major = v
            .trim_start_matches('v')
            .split('.')
            .next()
            .unwrap_or_default()
            .parse::<u16>()?;
        Ok(TypedValue::U16(major))
    });
    converters.register("tag", |v| Ok(format!("#{v}").into()));

    let mapper = Mapper::with_converters(converters).strict(true);

    for path in ["/releases/path-mapper/v1.2.3/stable", "/releases/path-mapper/vX/stable"] {
        let mut release = Release::default();
        match mapper.map("/releases/{project}/{version}/{tag}", path, &mut release) {
            Ok(()) => println!("{path} -> {release:?}"),
            Err(e) => println!("{path} -> error: {e}"),
        }
    }
}
