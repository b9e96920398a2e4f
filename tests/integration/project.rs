//! Library-level extraction over project trees on disk.

use sbt_extract::config::ExtractConfig;
use sbt_extract::extract::{Datasource, LocalFileReader, PackageDependency, PackageFile, extract_all_package_files};
use sbt_extract::test_utils::{ProjectFixture, init_test_logging};
use sbt_extract::utils::discovery::discover_package_files;

async fn extract_project(project: &ProjectFixture) -> Option<Vec<PackageFile>> {
    init_test_logging(None);
    let config = ExtractConfig::default();
    let files = discover_package_files(project.path(), &config.discovery).unwrap();
    extract_all_package_files(&config, &files, &LocalFileReader::new(project.path())).await
}

fn file<'a>(result: &'a [PackageFile], package_file: &str) -> &'a [PackageDependency] {
    result
        .iter()
        .find(|f| f.package_file == package_file)
        .map(|f| f.deps.as_slice())
        .unwrap_or_else(|| panic!("missing {package_file}"))
}

#[tokio::test]
async fn test_multi_module_project() {
    let project = ProjectFixture::multi_module().unwrap();
    let result = extract_project(&project).await.unwrap();

    let order: Vec<_> = result.iter().map(|f| f.package_file.as_str()).collect();
    assert_eq!(
        order,
        vec![
            "api/build.sbt",
            "project/Versions.scala",
            "build.sbt",
            "core/build.sbt",
            "project/build.properties",
            "project/plugins.sbt",
        ]
    );

    let api = file(&result, "api/build.sbt");
    assert_eq!(api.len(), 1);
    assert_eq!(api[0].package_name, "org.http4s:http4s-dsl_2.13");
    assert_eq!(api[0].variable_name.as_deref(), Some("http4sVersion"));
    assert_eq!(api[0].registry_urls, vec!["https://repo.maven.apache.org/maven2", "https://maven.example.com/releases"]);

    // cats-core is declared by both modules through the same shared variable.
    let versions = file(&result, "project/Versions.scala");
    let names: Vec<_> = versions.iter().map(|d| (d.package_name.as_str(), d.current_value.as_deref())).collect();
    assert_eq!(names, vec![("io.circe:circe-core_2.13", Some("0.14.6")), ("org.typelevel:cats-core_2.13", Some("2.10.0"))]);

    let root = file(&result, "build.sbt");
    assert_eq!(root.len(), 1);
    assert_eq!(root[0].datasource, Datasource::Maven);
    assert_eq!(root[0].current_value.as_deref(), Some("2.13.12"));

    let core = file(&result, "core/build.sbt");
    assert_eq!(core.len(), 1);
    assert_eq!(core[0].package_name, "org.scalatest:scalatest_2.13");
    assert_eq!(core[0].dep_type.as_deref(), Some("Test"));

    let sbt = file(&result, "project/build.properties");
    assert_eq!(sbt[0].package_name, "sbt/sbt");
    assert_eq!(sbt[0].current_value.as_deref(), Some("1.9.7"));

    let plugins = file(&result, "project/plugins.sbt");
    assert_eq!(plugins[0].datasource, Datasource::SbtPlugin);
    assert_eq!(
        plugins[0].registry_urls.last().map(String::as_str),
        Some("https://repo.scala-sbt.org/scalasbt/sbt-plugin-releases")
    );
}

#[tokio::test]
async fn test_broken_file_does_not_stop_siblings() {
    let project = ProjectFixture::new()
        .unwrap()
        .with_file("build.sbt", "lazy val root = (project in file(\".\")\n")
        .unwrap()
        .with_file("core/build.sbt", r#"libraryDependencies += "g" % "a" % "1""#)
        .unwrap();

    let result = extract_project(&project).await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].package_file, "core/build.sbt");
}

#[tokio::test]
async fn test_empty_project_finds_nothing() {
    let project = ProjectFixture::new().unwrap().with_file("build.sbt", "").unwrap();
    assert!(extract_project(&project).await.is_none());

    let empty = ProjectFixture::new().unwrap();
    assert!(extract_project(&empty).await.is_none());
}

#[tokio::test]
async fn test_configured_registries() {
    let project = ProjectFixture::new()
        .unwrap()
        .with_file(
            "sbt-extract.toml",
            "[registry_urls]\nmaven_central = \"https://mirror.example.com/maven2\"\nsbt_plugins = \"https://mirror.example.com/plugins\"\n",
        )
        .unwrap()
        .with_file("project/plugins.sbt", r#"addSbtPlugin("g" % "p" % "1")"#)
        .unwrap();

    let config = ExtractConfig::load_layers(None, project.path(), None).await.unwrap();
    let files = discover_package_files(project.path(), &config.discovery).unwrap();
    let result = extract_all_package_files(&config, &files, &LocalFileReader::new(project.path())).await.unwrap();

    assert_eq!(
        file(&result, "project/plugins.sbt")[0].registry_urls,
        vec!["https://mirror.example.com/maven2", "https://mirror.example.com/plugins"]
    );
}
