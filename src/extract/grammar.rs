//! sbt grammar: the rules recognized at every position of a build file.
//!
//! Alternatives are tried in this order, first match wins:
//!
//! 1. `scalaVersion := <string | symbol>`
//! 2. `version := <string | symbol>`
//! 3. dependency declarations (`%`, `%%`, `%%%` shapes, optional `val x =`
//!    prefix and optional qualifier)
//! 4. `addSbtPlugin(...)` / `addCompilerPlugin(...)`
//! 5. `resolvers += ...` / `resolvers ++= Seq(...)`
//! 6. variable definitions (`[lazy] val x[: String] = "..."`, `x := "..."`)
//!
//! Dependencies come before variable definitions so that `val core = "g" % "a"
//! % "1"` is read as a dependency rather than abandoned after `val core =`.

use super::context::{ExtractionContext, last_dot_segment};
use super::scala_version::{major_version, normalize_scala_version};
use super::types::{Datasource, PLUGIN_DEP_TYPE, PackageDependency, Variable};
use crate::constants::ROOT_SEARCH_MAX_DEPTH;
use crate::lexer::{Delimiter, Token};
use crate::matcher::{Query, Rule, TreeRule};
use std::sync::{Arc, OnceLock};
use tracing::trace;

type Ctx = ExtractionContext;

/// Functions whose single argument is a plugin coordinate.
const PLUGIN_FUNCTIONS: &[&str] = &["addSbtPlugin", "addCompilerPlugin"];

const SCALA_DEP_NAME: &str = "scala";
const SCALA2_LIBRARY: &str = "org.scala-lang:scala-library";
const SCALA3_LIBRARY: &str = "org.scala-lang:scala3-library_3";

/// The compiled query shared by every extraction pass.
pub fn query() -> &'static Query<Ctx> {
    static QUERY: OnceLock<Query<Ctx>> = OnceLock::new();
    QUERY.get_or_init(build_query)
}

/// Build the root query: every grammar alternative, searched through the
/// whole token tree, followed by the registry URL broadcast.
pub fn build_query() -> Query<Ctx> {
    let root = Rule::alt(vec![
        scala_version_rule(),
        package_file_version_rule(),
        dependency_rule(),
        plugin_rule(),
        resolver_rule(),
        variable_definition_rule(),
    ]);
    Query::new(root, ROOT_SEARCH_MAX_DEPTH).with_post_handler(broadcast_registry_urls)
}

fn token_text(token: &Token) -> String {
    token.text().unwrap_or_default().to_string()
}

fn resolved_value(ctx: &Ctx, token: &Token) -> Option<String> {
    let name = token.text()?;
    match ctx.resolve(name) {
        Some(variable) => Some(variable.value.clone()),
        None => {
            trace!(package_file = %ctx.package_file, symbol = name, "Unresolved symbol");
            None
        }
    }
}

// scalaVersion := ...

fn scala_version_rule() -> Rule<Ctx> {
    Rule::sym("scalaVersion")
        .op_then(":=")
        .then(Rule::alt(vec![Rule::str_with(scala_version_literal), Rule::sym_with(scala_version_symbol)]))
        .then_handler(emit_scala_library)
}

fn scala_version_literal(mut ctx: Ctx, token: &Token) -> Ctx {
    ctx.scratch.scala_version = Some(token_text(token));
    ctx
}

fn scala_version_symbol(mut ctx: Ctx, token: &Token) -> Ctx {
    if let Some(value) = resolved_value(&ctx, token) {
        ctx.scratch.scala_version = Some(value);
    }
    ctx
}

fn emit_scala_library(mut ctx: Ctx) -> Ctx {
    let Some(version) = ctx.scratch.take().scala_version else {
        return ctx;
    };

    let package_name = if major_version(&version) == Some(3) {
        SCALA3_LIBRARY
    } else {
        SCALA2_LIBRARY
    };
    let mut dep = PackageDependency::new(Datasource::Maven, SCALA_DEP_NAME, package_name);
    dep.separate_minor_patch = true;
    ctx.scala_version = Some(normalize_scala_version(&version));
    dep.current_value = Some(version);
    ctx.push_dep(dep);
    ctx
}

// version := ...

fn package_file_version_rule() -> Rule<Ctx> {
    Rule::sym("version").op_then(":=").then(Rule::alt(vec![
        Rule::str_with(package_file_version_literal),
        Rule::sym_with(package_file_version_symbol),
    ]))
}

fn package_file_version_literal(mut ctx: Ctx, token: &Token) -> Ctx {
    ctx.package_file_version = Some(token_text(token));
    ctx
}

fn package_file_version_symbol(mut ctx: Ctx, token: &Token) -> Ctx {
    if let Some(value) = resolved_value(&ctx, token) {
        ctx.package_file_version = Some(value);
    }
    ctx
}

// Variable definitions

fn variable_name() -> Rule<Ctx> {
    Rule::sym_with(capture_variable_name).then(Rule::opt(Rule::op(":").then(Rule::sym("String"))))
}

fn variable_definition_rule() -> Rule<Ctx> {
    let assignment = || Rule::sym("val").then(variable_name()).op_then("=");
    Rule::alt(vec![Rule::sym("lazy").then(assignment()), assignment(), variable_name().op_then(":=")])
        .then(Rule::str_with(store_variable))
}

fn capture_variable_name(mut ctx: Ctx, token: &Token) -> Ctx {
    ctx.scratch.current_var_name = Some(token_text(token));
    ctx
}

fn store_variable(mut ctx: Ctx, token: &Token) -> Ctx {
    if let Some(name) = ctx.scratch.take().current_var_name {
        let variable = Variable {
            value: token_text(token),
            source_file: ctx.package_file.clone(),
            line_index: token.line.saturating_sub(1),
        };
        ctx.define_var(name, variable);
    }
    ctx
}

// Dependencies

fn group_id() -> Rule<Ctx> {
    Rule::alt(vec![Rule::sym_with(group_id_symbol), Rule::str_with(group_id_literal)])
}

fn group_id_symbol(mut ctx: Ctx, token: &Token) -> Ctx {
    ctx.scratch.group_id = resolved_value(&ctx, token);
    ctx
}

fn group_id_literal(mut ctx: Ctx, token: &Token) -> Ctx {
    ctx.scratch.group_id = Some(token_text(token));
    ctx
}

fn artifact_id() -> Rule<Ctx> {
    Rule::alt(vec![Rule::sym_with(artifact_id_symbol), Rule::str_with(artifact_id_literal)])
}

fn artifact_id_symbol(mut ctx: Ctx, token: &Token) -> Ctx {
    ctx.scratch.artifact_id = resolved_value(&ctx, token);
    ctx
}

fn artifact_id_literal(mut ctx: Ctx, token: &Token) -> Ctx {
    ctx.scratch.artifact_id = Some(token_text(token));
    ctx
}

fn version() -> Rule<Ctx> {
    Rule::alt(vec![Rule::sym_with(version_symbol), Rule::str_with(version_literal)])
}

fn version_symbol(mut ctx: Ctx, token: &Token) -> Ctx {
    let name = token.text().unwrap_or_default();
    if let Some(variable) = ctx.resolve(name).cloned() {
        ctx.scratch.current_value = Some(variable.value);
        ctx.scratch.variable_name = Some(last_dot_segment(name).to_string());
        ctx.scratch.variable_source = Some(variable.source_file);
    } else {
        trace!(package_file = %ctx.package_file, symbol = name, "Unresolved version symbol");
    }
    ctx
}

fn version_literal(mut ctx: Ctx, token: &Token) -> Ctx {
    ctx.scratch.current_value = Some(token_text(token));
    ctx
}

fn mark_scala_suffix(mut ctx: Ctx) -> Ctx {
    ctx.scratch.use_scala_version = true;
    ctx
}

/// `group <op> artifact % version`; `%%` and `%%%` request the Scala suffix.
fn coordinates(group_op: &'static str, scala_suffix: bool) -> Rule<Ctx> {
    let rule = group_id().op_then(group_op).then(artifact_id());
    let rule = if scala_suffix {
        rule.then_handler(mark_scala_suffix)
    } else {
        rule
    };
    rule.op_then("%").then(version())
}

fn simple_dependency() -> Rule<Ctx> {
    coordinates("%", false)
}

fn versioned_dependency() -> Rule<Ctx> {
    coordinates("%%", true)
}

fn cross_dependency() -> Rule<Ctx> {
    coordinates("%%%", true)
}

fn qualifier() -> Rule<Ctx> {
    Rule::alt(vec![
        Rule::sym("classifier").then(Rule::str_with(set_dep_type)),
        Rule::op("%").then(Rule::sym_with(set_dep_type)),
        Rule::op("%").then(Rule::str_with(set_dep_type)),
    ])
}

fn set_dep_type(mut ctx: Ctx, token: &Token) -> Ctx {
    ctx.scratch.dep_type = Some(token_text(token));
    ctx
}

fn dependency_rule() -> Rule<Ctx> {
    let binding = Rule::opt(Rule::sym("lazy")).then(Rule::sym("val")).then(Rule::any_sym()).op_then("=");
    Rule::opt(binding)
        .then(Rule::alt(vec![cross_dependency(), simple_dependency(), versioned_dependency()]))
        .then(Rule::opt(qualifier()))
        .then_handler(complete_dependency)
}

fn complete_dependency(mut ctx: Ctx) -> Ctx {
    let scratch = ctx.scratch.take();
    let (Some(group_id), Some(artifact_id)) = (scratch.group_id, scratch.artifact_id) else {
        trace!(package_file = %ctx.package_file, "Skipping dependency with unresolved coordinates");
        return ctx;
    };

    let dep_name = format!("{group_id}:{artifact_id}");
    let package_name = match &ctx.scala_version {
        Some(scala_version) if scratch.use_scala_version => format!("{dep_name}_{scala_version}"),
        _ => dep_name.clone(),
    };
    let datasource = if scratch.dep_type.as_deref() == Some(PLUGIN_DEP_TYPE) {
        Datasource::SbtPlugin
    } else {
        Datasource::SbtPackage
    };

    let mut dep = PackageDependency::new(datasource, dep_name, package_name);
    dep.current_value = scratch.current_value;
    dep.dep_type = scratch.dep_type;
    if let Some(variable_name) = scratch.variable_name {
        dep.group_name = Some(variable_name.clone());
        dep.variable_name = Some(variable_name);
        dep.edit_file = scratch.variable_source;
    }
    ctx.push_dep(dep);
    ctx
}

// Plugins

fn mark_plugin(mut ctx: Ctx) -> Ctx {
    ctx.scratch.dep_type = Some(PLUGIN_DEP_TYPE.to_string());
    ctx
}

fn plugin_rule() -> Rule<Ctx> {
    let coordinate = Rule::alt(vec![simple_dependency(), versioned_dependency()]);
    Rule::sym_one_of(PLUGIN_FUNCTIONS)
        .then(Rule::tree(TreeRule::anchored(coordinate).delimited(Delimiter::Paren)))
        .then_handler(mark_plugin)
        .then_handler(complete_dependency)
}

// Resolvers

fn resolver_entry() -> Rule<Ctx> {
    Rule::str().then(Rule::sym("at")).then(Rule::str_with(add_registry_url))
}

fn resolver_rule() -> Rule<Ctx> {
    Rule::sym("resolvers").then(Rule::alt(vec![
        Rule::op("+=").then(resolver_entry()),
        Rule::op("++=").then(Rule::sym("Seq")).then(Rule::tree(TreeRule::searching(resolver_entry(), 1))),
    ]))
}

fn add_registry_url(mut ctx: Ctx, token: &Token) -> Ctx {
    let candidate = token_text(token);
    match url::Url::parse(&candidate) {
        Ok(_) => ctx.registry_urls.push(candidate),
        Err(e) => trace!(url = %candidate, error = %e, "Ignoring invalid resolver URL"),
    }
    ctx
}

/// Give every dependency of the file the file's registry list; plugins also
/// get the plugin registry.
fn broadcast_registry_urls(mut ctx: Ctx) -> Ctx {
    if ctx.deps.is_empty() {
        return ctx;
    }
    let registry_urls = ctx.registry_urls.clone();
    let plugin_registry_url = ctx.plugin_registry_url.clone();
    for dep in Arc::make_mut(&mut ctx.deps) {
        dep.registry_urls.clone_from(&registry_urls);
        if dep.is_plugin() {
            dep.registry_urls.push(plugin_registry_url.clone());
        }
    }
    ctx
}
