//! The default engine: a `strata-syntax` tree walker with minijinja
//! expressions.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use minijinja::{Environment, Value};
use strata_syntax::{Condition, Expr, NameArg, Node, SyntaxConfig, Template};
use tracing::trace;

use super::engine::{TemplateEngine, Vars, ViewHost};
use super::filters::{display, register_filters};
use crate::cache::ElementOptions;
use crate::error::{Result, ViewError};

struct Parsed {
    source: String,
    template: Template,
}

/// Template engine for the strata template language.
///
/// Parsed files are memoized by path and reused while their source is
/// unchanged. Expressions are compiled with the engine's minijinja
/// environment, so filters added through [`environment_mut`] are available
/// in every template.
///
/// [`environment_mut`]: StrataEngine::environment_mut
pub struct StrataEngine {
    env: Environment<'static>,
    syntax: SyntaxConfig,
    parsed: DashMap<PathBuf, Arc<Parsed>>,
}

impl StrataEngine {
    pub fn new() -> Self {
        Self::with_syntax(SyntaxConfig::default())
    }

    pub fn with_syntax(syntax: SyntaxConfig) -> Self {
        let mut env = Environment::new();
        register_filters(&mut env);
        Self {
            env,
            syntax,
            parsed: DashMap::new(),
        }
    }

    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Mutable access for registering custom filters and functions.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }

    /// Number of memoized parse trees.
    pub fn cached_templates(&self) -> usize {
        self.parsed.len()
    }

    fn parse(&self, path: &Path, source: &str) -> Result<Arc<Parsed>> {
        if let Some(hit) = self.parsed.get(path) {
            if hit.source == source {
                return Ok(Arc::clone(&hit));
            }
        }

        trace!(path = %path.display(), "parsing");
        let template =
            strata_syntax::parse_with(source, &self.syntax).map_err(|source| ViewError::Syntax {
                path: path.to_path_buf(),
                source,
            })?;
        let parsed = Arc::new(Parsed {
            source: source.to_string(),
            template,
        });
        self.parsed.insert(path.to_path_buf(), Arc::clone(&parsed));
        Ok(parsed)
    }

    fn eval(&self, expr: &Expr, frame: &Frame<'_>) -> Result<Value> {
        let compiled = self
            .env
            .compile_expression(&expr.source)
            .map_err(|e| expression_error(frame.path, expr.line, e))?;
        compiled
            .eval(&frame.vars)
            .map_err(|e| expression_error(frame.path, expr.line, e))
    }

    fn name(&self, arg: &NameArg, frame: &Frame<'_>) -> Result<String> {
        match arg {
            NameArg::Literal(name) => Ok(name.clone()),
            NameArg::Expr(expr) => Ok(display(&self.eval(expr, frame)?)),
        }
    }

    fn test(&self, condition: &Condition, frame: &Frame<'_>, host: &dyn ViewHost) -> Result<bool> {
        match condition {
            Condition::BlockExists(block) => Ok(host.block_exists(block)),
            Condition::Expr(expr) => Ok(self.eval(expr, frame)?.is_true()),
        }
    }

    fn render_nodes(
        &self,
        nodes: &[Node],
        frame: &mut Frame<'_>,
        out: &mut Writer,
        host: &mut dyn ViewHost,
    ) -> Result<()> {
        for node in nodes {
            match node {
                Node::Text(text) => out.push(text),
                Node::Output(expr) => {
                    let value = self.eval(expr, frame)?;
                    out.push(&display(&value));
                }
                Node::If {
                    branches,
                    otherwise,
                } => {
                    let mut taken = otherwise;
                    for (condition, body) in branches {
                        if self.test(condition, frame, host)? {
                            taken = body;
                            break;
                        }
                    }
                    self.render_nodes(taken, frame, out, host)?;
                }
                Node::For {
                    var,
                    iterable,
                    body,
                    empty,
                } => self.render_for(var, iterable, body, empty, frame, out, host)?,
                Node::Extend { name, .. } => {
                    let name = self.name(name, frame)?;
                    host.extend(&name)?;
                }
                Node::Start { block, mode, .. } => {
                    host.start_block(block, *mode)?;
                    out.open();
                }
                Node::End { .. } => {
                    let captured = out.close().ok_or(ViewError::EndWithoutStart)?;
                    host.end_block(captured)?;
                }
                Node::Write { block, value, mode } => {
                    let value = display(&self.eval(value, frame)?);
                    host.write_block(block, &value, *mode)?;
                }
                Node::Reset { block } => host.reset_block(block),
                Node::Fetch { block, default } => {
                    let content = match default {
                        Some(default) if !host.block_exists(block) => {
                            display(&self.eval(default, frame)?)
                        }
                        _ => host.fetch(block),
                    };
                    out.push(&content);
                }
                Node::Element {
                    name,
                    data,
                    options,
                    line,
                } => {
                    let name = self.name(name, frame)?;
                    let data = match data {
                        Some(expr) => element_data(self.eval(expr, frame)?, frame.path, *line)?,
                        None => Vars::new(),
                    };
                    let options = match options {
                        Some(expr) => ElementOptions::from_value(to_json(
                            &self.eval(expr, frame)?,
                            frame.path,
                            *line,
                        )?)?,
                        None => ElementOptions::default(),
                    };
                    let rendered = host.element(&name, data, options)?;
                    out.push(&rendered);
                }
                Node::Cache {
                    key, config, body, ..
                } => {
                    let key = display(&self.eval(key, frame)?);
                    let rendered =
                        host.cache(&key, config.as_deref(), &mut |host: &mut dyn ViewHost| {
                            let mut inner = Writer::new();
                            self.render_nodes(body, frame, &mut inner, host)?;
                            Ok(inner.finish())
                        })?;
                    out.push(&rendered);
                }
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn render_for(
        &self,
        var: &str,
        iterable: &Expr,
        body: &[Node],
        empty: &[Node],
        frame: &mut Frame<'_>,
        out: &mut Writer,
        host: &mut dyn ViewHost,
    ) -> Result<()> {
        let value = self.eval(iterable, frame)?;
        let items: Vec<Value> = if value.is_undefined() || value.is_none() {
            Vec::new()
        } else {
            value
                .try_iter()
                .map_err(|e| expression_error(frame.path, iterable.line, e))?
                .collect()
        };

        if items.is_empty() {
            return self.render_nodes(empty, frame, out, host);
        }

        let shadowed_var = frame.vars.remove(var);
        let shadowed_loop = frame.vars.remove("loop");
        let length = items.len();

        for (index, item) in items.into_iter().enumerate() {
            frame.vars.insert(var.to_string(), item);
            frame.vars.insert(
                "loop".to_string(),
                minijinja::context! {
                    index => index + 1,
                    index0 => index,
                    first => index == 0,
                    last => index + 1 == length,
                    length => length,
                },
            );
            self.render_nodes(body, frame, out, host)?;
        }

        frame.restore(var, shadowed_var);
        frame.restore("loop", shadowed_loop);
        Ok(())
    }
}

impl Default for StrataEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StrataEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrataEngine")
            .field("syntax", &self.syntax)
            .field("cached_templates", &self.parsed.len())
            .finish()
    }
}

impl TemplateEngine for StrataEngine {
    fn evaluate(
        &self,
        path: &Path,
        source: &str,
        scope: &Vars,
        host: &mut dyn ViewHost,
    ) -> Result<String> {
        let parsed = self.parse(path, source)?;

        // Helpers go in first so view variables shadow them.
        let mut vars: BTreeMap<String, Value> = host
            .helpers()
            .iter()
            .map(|(name, helper)| (name.to_string(), helper.clone()))
            .collect();
        for (name, value) in scope {
            vars.insert(name.clone(), Value::from_serialize(value));
        }

        let mut frame = Frame { path, vars };
        let mut out = Writer::new();
        self.render_nodes(&parsed.template.nodes, &mut frame, &mut out, host)?;
        Ok(out.finish())
    }

    fn invalidate(&self, path: &Path) {
        self.parsed.remove(path);
    }
}

/// Variables of one evaluation.
struct Frame<'a> {
    path: &'a Path,
    vars: BTreeMap<String, Value>,
}

impl Frame<'_> {
    fn restore(&mut self, name: &str, previous: Option<Value>) {
        match previous {
            Some(value) => {
                self.vars.insert(name.to_string(), value);
            }
            None => {
                self.vars.remove(name);
            }
        }
    }
}

/// Output buffers of one evaluation. The bottom buffer is the file output;
/// each open capture pushes another.
struct Writer {
    buffers: Vec<String>,
}

impl Writer {
    fn new() -> Self {
        Self {
            buffers: vec![String::new()],
        }
    }

    fn push(&mut self, text: &str) {
        if let Some(top) = self.buffers.last_mut() {
            top.push_str(text);
        }
    }

    fn open(&mut self) {
        self.buffers.push(String::new());
    }

    fn close(&mut self) -> Option<String> {
        if self.buffers.len() > 1 {
            self.buffers.pop()
        } else {
            None
        }
    }

    fn finish(self) -> String {
        self.buffers.concat()
    }
}

fn expression_error(path: &Path, line: usize, err: minijinja::Error) -> ViewError {
    ViewError::Expression {
        path: path.to_path_buf(),
        line,
        message: err.to_string(),
    }
}

fn to_json(value: &Value, path: &Path, line: usize) -> Result<serde_json::Value> {
    if value.is_undefined() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::to_value(value).map_err(|e| ViewError::Expression {
        path: path.to_path_buf(),
        line,
        message: e.to_string(),
    })
}

fn element_data(value: Value, path: &Path, line: usize) -> Result<Vars> {
    match to_json(&value, path, line)? {
        serde_json::Value::Object(map) => Ok(map),
        serde_json::Value::Null => Ok(Vars::new()),
        other => Err(ViewError::Expression {
            path: path.to_path_buf(),
            line,
            message: format!("element data must be a map, got {other}"),
        }),
    }
}
