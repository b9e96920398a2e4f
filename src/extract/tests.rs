use super::*;
use crate::config::{ExtractConfig, RegistryUrls};
use crate::constants::{MAVEN_CENTRAL, SBT_PLUGINS_REPO};
use crate::test_utils::init_test_logging;
use std::collections::HashMap;
use std::sync::Arc;

fn extract(files: &[(&str, &str)]) -> Option<Vec<PackageFile>> {
    init_test_logging(None);
    let files = files.iter().map(|(path, content)| FileContent::new(*path, *content)).collect();
    extract_from_contents(&RegistryUrls::default(), files)
}

fn deps<'a>(package_files: &'a [PackageFile], package_file: &str) -> &'a [PackageDependency] {
    package_files
        .iter()
        .find(|file| file.package_file == package_file)
        .map(|file| file.deps.as_slice())
        .unwrap_or_else(|| panic!("no package file {package_file}"))
}

fn find<'a>(deps: &'a [PackageDependency], dep_name: &str) -> &'a PackageDependency {
    deps.iter().find(|dep| dep.dep_name == dep_name).unwrap_or_else(|| panic!("no dependency {dep_name}"))
}

fn package_names(deps: &[PackageDependency]) -> Vec<&str> {
    deps.iter().map(|dep| dep.package_name.as_str()).collect()
}

#[test]
fn test_operator_shapes_with_scala_version() {
    let result = extract(&[(
        "build.sbt",
        r#"
        scalaVersion := "2.13.8"
        libraryDependencies ++= Seq(
          "com.example" % "simple" % "1.0.0",
          "com.example" %% "versioned" % "2.0.0",
          "com.example" %%% "cross" % "3.0.0",
        )
        "#,
    )])
    .unwrap();

    let deps = deps(&result, "build.sbt");
    assert_eq!(
        package_names(deps),
        vec![
            "org.scala-lang:scala-library",
            "com.example:simple",
            "com.example:versioned_2.13",
            "com.example:cross_2.13",
        ]
    );

    let scala = find(deps, "scala");
    assert_eq!(scala.datasource, Datasource::Maven);
    assert_eq!(scala.current_value.as_deref(), Some("2.13.8"));
    assert!(scala.separate_minor_patch);

    let versioned = find(deps, "com.example:versioned");
    assert_eq!(versioned.datasource, Datasource::SbtPackage);
    assert_eq!(versioned.current_value.as_deref(), Some("2.0.0"));
    assert_eq!(versioned.registry_urls, vec![MAVEN_CENTRAL]);
}

#[test]
fn test_no_suffix_without_scala_version() {
    let result = extract(&[("build.sbt", r#"libraryDependencies += "g" %% "a" % "1.0""#)]).unwrap();
    assert_eq!(package_names(deps(&result, "build.sbt")), vec!["g:a"]);
}

#[test]
fn test_scala3_library_and_suffix() {
    let result = extract(&[(
        "build.sbt",
        r#"
        ThisBuild / scalaVersion := "3.3.1"
        libraryDependencies += "org.typelevel" %% "cats-core" % "2.10.0"
        "#,
    )])
    .unwrap();
    assert_eq!(
        package_names(deps(&result, "build.sbt")),
        vec!["org.scala-lang:scala3-library_3", "org.typelevel:cats-core_3"]
    );
}

#[test]
fn test_scala_version_from_variable() {
    let result = extract(&[(
        "build.sbt",
        r#"
        val scalaV = "2.12.18"
        scalaVersion := scalaV
        libraryDependencies += "g" %% "a" % "1"
        "#,
    )])
    .unwrap();
    let deps = deps(&result, "build.sbt");
    assert_eq!(find(deps, "scala").current_value.as_deref(), Some("2.12.18"));
    assert_eq!(find(deps, "g:a").package_name, "g:a_2.12");
}

#[test]
fn test_unresolved_scala_version_emits_nothing() {
    let result = extract(&[(
        "build.sbt",
        r#"
        scalaVersion := Settings.unknown
        libraryDependencies += "g" %% "a" % "1"
        "#,
    )])
    .unwrap();
    assert_eq!(package_names(deps(&result, "build.sbt")), vec!["g:a"]);
}

#[test]
fn test_version_from_variable() {
    let result = extract(&[(
        "build.sbt",
        r#"
        val x = "1.2.3"
        libraryDependencies += "g" % "a" % x
        "#,
    )])
    .unwrap();
    let dep = find(deps(&result, "build.sbt"), "g:a");
    assert_eq!(dep.current_value.as_deref(), Some("1.2.3"));
    assert_eq!(dep.variable_name.as_deref(), Some("x"));
    assert_eq!(dep.group_name.as_deref(), Some("x"));
    assert_eq!(dep.edit_file.as_deref(), Some("build.sbt"));
}

#[test]
fn test_dotted_reference_resolves_last_segment() {
    let result = extract(&[
        (
            "project/Versions.scala",
            r#"
            object Versions {
              val y = "2.0"
            }
            "#,
        ),
        ("build.sbt", r#"libraryDependencies += "g" % "a" % Versions.y"#),
    ])
    .unwrap();

    // The dependency is filed under the file that defines the version.
    assert_eq!(result.len(), 1);
    let dep = find(deps(&result, "project/Versions.scala"), "g:a");
    assert_eq!(dep.current_value.as_deref(), Some("2.0"));
    assert_eq!(dep.variable_name.as_deref(), Some("y"));
}

#[test]
fn test_symbols_for_group_and_artifact() {
    let result = extract(&[(
        "build.sbt",
        r#"
        val org = "com.example"
        val name = "lib"
        libraryDependencies += org %% name % "1.0"
        "#,
    )])
    .unwrap();
    let dep = find(deps(&result, "build.sbt"), "com.example:lib");
    assert_eq!(dep.current_value.as_deref(), Some("1.0"));
    assert!(dep.variable_name.is_none());
}

#[test]
fn test_locals_are_scoped_to_their_group() {
    let result = extract(&[
        ("a/build.sbt", r#"val av = "1.0""#),
        ("a/deps.sbt", r#"libraryDependencies += "g" % "a" % av"#),
        ("b/build.sbt", r#"libraryDependencies += "g" % "b" % av"#),
    ])
    .unwrap();

    let a = find(deps(&result, "a/build.sbt"), "g:a");
    assert_eq!(a.current_value.as_deref(), Some("1.0"));
    assert_eq!(a.edit_file.as_deref(), Some("a/build.sbt"));

    let b = find(deps(&result, "b/build.sbt"), "g:b");
    assert!(b.current_value.is_none());
    assert!(b.variable_name.is_none());
}

#[test]
fn test_later_definitions_are_not_visible_to_earlier_files() {
    let result = extract(&[
        ("a/deps.sbt", r#"libraryDependencies += "g" % "a" % av"#),
        ("a/versions.sbt", r#"val av = "1.0""#),
    ])
    .unwrap();
    assert!(find(deps(&result, "a/deps.sbt"), "g:a").current_value.is_none());
}

#[test]
fn test_globals_are_fallback_and_never_mutated() {
    let result = extract(&[
        ("build.sbt", r#"val shared = "9.9""#),
        (
            "sub/build.sbt",
            r#"
            val shared = "1.0"
            libraryDependencies += "g" % "a" % shared
            "#,
        ),
        ("other/build.sbt", r#"libraryDependencies += "g" % "b" % shared"#),
    ])
    .unwrap();

    assert_eq!(find(deps(&result, "sub/build.sbt"), "g:a").current_value.as_deref(), Some("1.0"));

    let other = find(deps(&result, "build.sbt"), "g:b");
    assert_eq!(other.current_value.as_deref(), Some("9.9"));
    assert_eq!(other.edit_file.as_deref(), Some("build.sbt"));
}

#[test]
fn test_root_scala_version_overrides_project_dir() {
    let result = extract(&[
        ("project/Build.scala", r#"scalaVersion := "2.12.18""#),
        ("build.sbt", r#"scalaVersion := "2.13.8""#),
        ("core/build.sbt", r#"libraryDependencies += "g" %% "a" % "1""#),
    ])
    .unwrap();
    assert_eq!(package_names(deps(&result, "core/build.sbt")), vec!["g:a_2.13"]);
}

#[test]
fn test_resolvers() {
    let result = extract(&[(
        "build.sbt",
        r#"
        resolvers += "repo" at "https://example.com/repo"
        resolvers += "bad" at "not a url"
        libraryDependencies += "g" % "a" % "1"
        "#,
    )])
    .unwrap();
    assert_eq!(find(deps(&result, "build.sbt"), "g:a").registry_urls, vec![MAVEN_CENTRAL, "https://example.com/repo"]);
}

#[test]
fn test_resolver_sequence_reaches_other_groups() {
    let result = extract(&[
        (
            "build.sbt",
            r#"
            resolvers ++= Seq(
              "first" at "https://first.example.com/maven",
              "second" at "https://second.example.com/maven"
            )
            "#,
        ),
        ("core/build.sbt", r#"libraryDependencies += "g" % "a" % "1""#),
    ])
    .unwrap();
    assert_eq!(
        find(deps(&result, "core/build.sbt"), "g:a").registry_urls,
        vec![MAVEN_CENTRAL, "https://first.example.com/maven", "https://second.example.com/maven"]
    );
}

#[test]
fn test_plugins_carry_plugin_registry() {
    let result = extract(&[
        ("build.sbt", r#"scalaVersion := "2.13.8""#),
        (
            "project/plugins.sbt",
            r#"
            addSbtPlugin("com.github.sbt" % "sbt-native-packager" % "1.9.16")
            addCompilerPlugin("org.typelevel" %% "kind-projector" % "0.13.2")
            libraryDependencies += "g" % "not-a-plugin" % "1"
            "#,
        ),
    ])
    .unwrap();

    let deps = deps(&result, "project/plugins.sbt");
    let packager = find(deps, "com.github.sbt:sbt-native-packager");
    assert_eq!(packager.datasource, Datasource::SbtPlugin);
    assert_eq!(packager.dep_type.as_deref(), Some("plugin"));
    assert_eq!(packager.registry_urls, vec![MAVEN_CENTRAL, SBT_PLUGINS_REPO]);

    let projector = find(deps, "org.typelevel:kind-projector");
    assert_eq!(projector.package_name, "org.typelevel:kind-projector_2.13");
    assert!(projector.registry_urls.iter().any(|url| url == SBT_PLUGINS_REPO));

    let library = find(deps, "g:not-a-plugin");
    assert_eq!(library.datasource, Datasource::SbtPackage);
    assert!(!library.registry_urls.iter().any(|url| url == SBT_PLUGINS_REPO));
}

#[test]
fn test_plugin_must_fill_its_parentheses() {
    let result = extract(&[(
        "project/plugins.sbt",
        r#"addSbtPlugin("org" % "plugin" % "1.0" exclude("a", "b"))"#,
    )])
    .unwrap();
    // Not a plugin declaration, but the inner coordinate is still a dependency.
    let dep = find(deps(&result, "project/plugins.sbt"), "org:plugin");
    assert_eq!(dep.datasource, Datasource::SbtPackage);
    assert!(dep.dep_type.is_none());
}

#[test]
fn test_duplicates_collapse_per_edit_target() {
    let result = extract(&[
        (
            "build.sbt",
            r#"
            val v = "1.0"
            libraryDependencies += "g" % "x" % "1"
            libraryDependencies += "g" % "x" % "1" % Test
            libraryDependencies += "g" % "x" % "2"
            "#,
        ),
        ("m1/build.sbt", r#"libraryDependencies += "g" % "a" % v"#),
        ("m2/build.sbt", r#"libraryDependencies += "g" % "a" % v"#),
    ])
    .unwrap();

    assert_eq!(result.len(), 1);
    let deps = deps(&result, "build.sbt");
    let versions: Vec<_> = deps.iter().map(|dep| (dep.package_name.as_str(), dep.current_value.as_deref())).collect();
    assert_eq!(versions, vec![("g:x", Some("1")), ("g:x", Some("2")), ("g:a", Some("1.0"))]);
    // First occurrence kept: no qualifier.
    assert!(deps[0].dep_type.is_none());
}

#[test]
fn test_qualifiers() {
    let result = extract(&[(
        "build.sbt",
        r#"
        libraryDependencies ++= Seq(
          "g" % "test-lib" % "1" % Test,
          "g" % "provided-lib" % "1" % "provided",
          "g" % "classified" % "1" classifier "tests"
        )
        "#,
    )])
    .unwrap();
    let deps = deps(&result, "build.sbt");
    assert_eq!(find(deps, "g:test-lib").dep_type.as_deref(), Some("Test"));
    assert_eq!(find(deps, "g:provided-lib").dep_type.as_deref(), Some("provided"));
    assert_eq!(find(deps, "g:classified").dep_type.as_deref(), Some("tests"));
}

#[test]
fn test_val_bound_dependencies() {
    let result = extract(&[(
        "project/Dependencies.scala",
        r#"
        object Dependencies {
          lazy val cats = "org.typelevel" %% "cats-core" % "2.10.0"
          val circe = "io.circe" %% "circe-core" % "0.14.6"
        }
        "#,
    )])
    .unwrap();
    assert_eq!(
        package_names(deps(&result, "project/Dependencies.scala")),
        vec!["org.typelevel:cats-core", "io.circe:circe-core"]
    );
}

#[test]
fn test_unresolved_version_is_passed_through() {
    let result = extract(&[("build.sbt", r#"libraryDependencies += "g" % "a" % missingVersion"#)]).unwrap();
    let dep = find(deps(&result, "build.sbt"), "g:a");
    assert!(dep.current_value.is_none());
    assert!(dep.variable_name.is_none());
    assert_eq!(dep.edit_file.as_deref(), Some("build.sbt"));
}

#[test]
fn test_unresolved_coordinates_are_skipped() {
    assert!(extract(&[("build.sbt", r#"libraryDependencies += missingGroup % "a" % "1""#)]).is_none());
}

#[test]
fn test_scratch_does_not_leak_between_matches() {
    let result = extract(&[(
        "build.sbt",
        r#"
        scalaVersion := "2.13.8"
        libraryDependencies += "x" %% "y" % "1" % Test
        libraryDependencies += "g" % "b" % "2"
        libraryDependencies += missing %% "z" % "3"
        libraryDependencies += "h" % "c" % "4"
        "#,
    )])
    .unwrap();
    let deps = deps(&result, "build.sbt");
    let b = find(deps, "g:b");
    assert_eq!(b.package_name, "g:b");
    assert!(b.dep_type.is_none());
    assert_eq!(find(deps, "h:c").package_name, "h:c");
}

#[test]
fn test_templates_do_not_match() {
    assert!(extract(&[("build.sbt", r#"libraryDependencies += "g" % s"$name-core" % "1""#)]).is_none());
}

#[test]
fn test_nesting_beyond_search_depth() {
    let dependency = r#""g" % "a" % "1""#;
    let shallow = format!("{}{}{}", "(".repeat(10), dependency, ")".repeat(10));
    let deep = format!("{}{}{}", "(".repeat(40), dependency, ")".repeat(40));

    assert!(extract(&[("build.sbt", &shallow)]).is_some());
    assert!(extract(&[("build.sbt", &deep)]).is_none());
}

#[test]
fn test_build_properties() {
    let result = extract(&[("project/build.properties", "sbt.version = 1.9.7\n")]).unwrap();
    let deps = deps(&result, "project/build.properties");
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].datasource, Datasource::GithubReleases);
    assert_eq!(deps[0].current_value.as_deref(), Some("1.9.7"));

    assert!(extract(&[("project/build.properties", "sbt.launcher = true\n")]).is_none());
}

#[test]
fn test_tokenizer_failure_is_isolated() {
    let result = extract(&[
        ("broken.sbt", "val x = \"unterminated\nlibraryDependencies += \"g\" % \"lost\" % \"1\""),
        ("build.sbt", r#"libraryDependencies += "g" % "kept" % "1""#),
    ])
    .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(package_names(deps(&result, "build.sbt")), vec!["g:kept"]);
}

#[test]
fn test_excessive_nesting_is_isolated() {
    let depth = 1_000_000;
    let nested = format!(
        "libraryDependencies += \"g\" % \"lost\" % \"1\"\nval x = {}{}",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    let result = extract(&[
        ("build.sbt", nested.as_str()),
        ("other.sbt", r#"libraryDependencies += "g" % "kept" % "1""#),
    ])
    .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(package_names(deps(&result, "other.sbt")), vec!["g:kept"]);
}

#[test]
fn test_build_properties_does_not_reset_group_locals() {
    let result = extract(&[
        ("sub/project/Deps.scala", r#"object Deps { val catsV = "2.10.0" }"#),
        ("sub/project/build.properties", "sbt.version=1.9.7\n"),
        ("sub/project/plugins.sbt", r#"libraryDependencies += "org.typelevel" % "cats-core" % catsV"#),
    ])
    .unwrap();

    let dep = find(deps(&result, "sub/project/Deps.scala"), "org.typelevel:cats-core");
    assert_eq!(dep.current_value.as_deref(), Some("2.10.0"));
    assert_eq!(dep.variable_name.as_deref(), Some("catsV"));
    assert_eq!(find(deps(&result, "sub/project/build.properties"), "sbt/sbt").current_value.as_deref(), Some("1.9.7"));
}

#[test]
fn test_variable_definitions_record_source_line() {
    let registries = RegistryUrls::default();
    let result = extract_file(
        "name := \"demo\"\nlazy val v: String = \"1.0\"\n",
        ParseOptions {
            package_file: "build.sbt",
            registries: &registries,
            registry_urls: &[],
            local_vars: Arc::default(),
            global_vars: Arc::default(),
            scala_version: None,
        },
    )
    .unwrap();

    assert_eq!(result.local_vars["name"].value, "demo");
    let v = &result.local_vars["v"];
    assert_eq!(v.value, "1.0");
    assert_eq!(v.source_file, "build.sbt");
    assert_eq!(v.line_index, 1);
}

#[test]
fn test_version_setting_is_not_a_dependency() {
    let registries = RegistryUrls::default();
    let result = extract_file(
        "version := \"0.1.0-SNAPSHOT\"",
        ParseOptions {
            package_file: "build.sbt",
            registries: &registries,
            registry_urls: &[],
            local_vars: Arc::default(),
            global_vars: Arc::default(),
            scala_version: None,
        },
    )
    .unwrap();
    assert_eq!(result.package_file_version.as_deref(), Some("0.1.0-SNAPSHOT"));
    assert!(result.deps.is_empty());
    assert!(result.local_vars.is_empty());
}

#[test]
fn test_nothing_found() {
    assert!(extract(&[]).is_none());
    assert!(extract(&[("build.sbt", "name := \"demo\"")]).is_none());
}

#[tokio::test]
async fn test_empty_and_missing_files_yield_nothing() {
    init_test_logging(None);
    let mut contents = HashMap::new();
    contents.insert("build.sbt".to_string(), String::new());
    let files = vec!["build.sbt".to_string(), "project/plugins.sbt".to_string()];

    assert!(extract_all_package_files(&ExtractConfig::default(), &files, &contents).await.is_none());
}

#[tokio::test]
async fn test_extract_all_package_files_preserves_input_order() {
    init_test_logging(None);
    let mut contents = HashMap::new();
    contents.insert("b/build.sbt".to_string(), r#"libraryDependencies += "g" % "b" % "1""#.to_string());
    contents.insert("a/build.sbt".to_string(), r#"libraryDependencies += "g" % "a" % "1""#.to_string());
    let files = vec!["b/build.sbt".to_string(), "a/build.sbt".to_string()];

    let config = ExtractConfig {
        max_concurrent_reads: 1,
        ..ExtractConfig::default()
    };
    let result = extract_all_package_files(&config, &files, &contents).await.unwrap();
    let order: Vec<_> = result.iter().map(|file| file.package_file.as_str()).collect();
    assert_eq!(order, vec!["b/build.sbt", "a/build.sbt"]);
}

#[test]
fn test_json_output_is_camel_case() {
    let result = extract(&[("build.sbt", r#"libraryDependencies += "g" % "a" % "1""#)]).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    let dep = &json[0]["deps"][0];
    assert_eq!(json[0]["packageFile"], "build.sbt");
    assert_eq!(dep["datasource"], "sbt-package");
    assert_eq!(dep["depName"], "g:a");
    assert_eq!(dep["currentValue"], "1");
    assert_eq!(dep["editFile"], "build.sbt");
    assert!(dep.get("separateMinorPatch").is_none());
}
