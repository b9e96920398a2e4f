//! Temporary sbt project trees for tests.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A project directory that is removed when dropped.
#[derive(Debug)]
pub struct ProjectFixture {
    temp: TempDir,
}

impl ProjectFixture {
    /// An empty project.
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp: TempDir::new().context("Failed to create temp dir")?,
        })
    }

    /// Add a file, creating parent directories.
    pub fn with_file(self, relative: &str, content: &str) -> Result<Self> {
        self.write(relative, content)?;
        Ok(self)
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.temp.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Root of the project.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// A typical multi-module build: shared versions under `project/`, a root
    /// build with resolvers and two modules.
    pub fn multi_module() -> Result<Self> {
        Self::new()?
            .with_file("project/build.properties", "sbt.version = 1.9.7\n")?
            .with_file(
                "project/plugins.sbt",
                r#"addSbtPlugin("com.github.sbt" % "sbt-native-packager" % "1.9.16")"#,
            )?
            .with_file(
                "project/Versions.scala",
                r#"
object Versions {
  val cats = "2.10.0"
  val circe = "0.14.6"
}
"#,
            )?
            .with_file(
                "build.sbt",
                r#"
ThisBuild / scalaVersion := "2.13.12"
ThisBuild / version := "0.1.0-SNAPSHOT"

resolvers += "internal" at "https://maven.example.com/releases"

lazy val core = (project in file("core"))
lazy val api = (project in file("api")).dependsOn(core)
"#,
            )?
            .with_file(
                "core/build.sbt",
                r#"
libraryDependencies ++= Seq(
  "org.typelevel" %% "cats-core" % Versions.cats,
  "org.scalatest" %% "scalatest" % "3.2.17" % Test
)
"#,
            )?
            .with_file(
                "api/build.sbt",
                r#"
val http4sVersion = "0.23.24"
libraryDependencies ++= Seq(
  "org.http4s" %% "http4s-dsl" % http4sVersion,
  "io.circe" %% "circe-core" % Versions.circe,
  "org.typelevel" %% "cats-core" % Versions.cats
)
"#,
            )
    }
}
