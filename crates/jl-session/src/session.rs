use std::path::Path;

use jl_config::EditorConfig;
use jl_core::{
    ConversionOption, Converter, EditorHistoryState, HistoryManager, HistoryStats, PersistStatus,
    SaveOutcome, SessionStorage, open_storage,
};
use jl_lang::{CheckError, Node, NodeId, OperatorCatalog};
use orion_error::op_context;
use orion_error::prelude::*;
use orion_error::ErrorOweBase;
use serde_json::Value;

use crate::error::{SessionReason, SessionResult};

/// One editor session: the converter and the undo/redo log behind a single
/// handle. Built once when the editor opens and passed by reference to
/// whatever drives the UI.
pub struct EditorSession {
    config: EditorConfig,
    converter: Converter<'static>,
    history: HistoryManager,
}

impl EditorSession {
    /// Open a session on the storage backend selected in `config`.
    pub fn open(config: EditorConfig) -> SessionResult<Self> {
        let mut op = op_context!("editor-session-open").with_auto_log();
        let backend = format!("{:?}", config.storage.backend).to_lowercase();
        op.record("backend", backend.as_str());
        op.record("storage_key", config.history.storage_key.as_str());

        let storage = open_storage(&config.storage).err_conv()?;
        let session = Self::with_storage(config, storage);

        op.mark_suc();
        Ok(session)
    }

    /// Load `editor.toml` from `path` and open a session on it.
    pub fn load(path: &Path) -> SessionResult<Self> {
        let config = EditorConfig::load(path).owe(SessionReason::Bootstrap)?;
        jl_debug!(conf, path = %path.display(), "editor config loaded");
        Self::open(config)
    }

    /// Open a session on a caller-provided storage backend.
    pub fn with_storage(config: EditorConfig, storage: Box<dyn SessionStorage>) -> Self {
        let converter = Converter::new(OperatorCatalog::standard(), config.heuristics.clone());
        let history = HistoryManager::open(config.history.clone(), storage);
        jl_info!(
            sys,
            entries = history.entries().len(),
            capacity = config.history.capacity,
            settle = %config.history.settle,
            "editor session opened"
        );
        Self {
            config,
            converter,
            history,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &'static OperatorCatalog {
        self.converter.catalog()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    // -- conversion ---------------------------------------------------------

    pub fn list_convertible_operators(&self, current: &str) -> Vec<ConversionOption> {
        self.converter.list_convertible_operators(current)
    }

    /// Pure conversion; the history is not touched.
    pub fn convert(&self, node: &Node, target: &str) -> Node {
        self.converter.convert(node, target)
    }

    /// Convert the node `id` inside `forest` to `target`, splice the result
    /// in place and record the new forest as `"Convert A to B"`.
    pub fn convert_in_forest(
        &mut self,
        forest: &mut [Node],
        id: &NodeId,
        target: &str,
    ) -> SessionResult<SaveOutcome> {
        let Some(node) = jl_lang::find_in_forest(forest, id) else {
            return StructError::from(SessionReason::NodeNotFound)
                .with_detail(format!("no node with id {}", id.as_str()))
                .err();
        };
        let source = node.operator().unwrap_or(node.kind().as_str()).to_string();
        let converted = self.converter.convert(node, target);
        if converted == *node {
            jl_debug!(conv, node = id.as_str(), to = target, "conversion left node unchanged");
            return Ok(SaveOutcome::Unchanged);
        }
        splice(forest, id, converted)?;

        let description = format!("Convert {source} to {target}");
        jl_debug!(conv, node = id.as_str(), from = %source, to = target, "node converted");
        Ok(self.save_state(forest, &description))
    }

    // -- history ------------------------------------------------------------

    pub fn save_state(&mut self, forest: &[Node], description: &str) -> SaveOutcome {
        let outcome = self.history.save_state(forest, description);
        match outcome {
            SaveOutcome::Recorded => {
                jl_debug!(
                    hist,
                    description,
                    total = self.history.entries().len(),
                    "snapshot recorded"
                );
                self.report_persist();
            }
            SaveOutcome::Suppressed => {
                jl_debug!(hist, description, "snapshot suppressed while restoring")
            }
            SaveOutcome::Unchanged => {}
        }
        outcome
    }

    pub fn undo(&mut self) -> Option<EditorHistoryState> {
        let state = self.history.undo()?;
        jl_info!(hist, description = %state.description, "undo");
        self.report_persist();
        Some(state)
    }

    pub fn redo(&mut self) -> Option<EditorHistoryState> {
        let state = self.history.redo()?;
        jl_info!(hist, description = %state.description, "redo");
        self.report_persist();
        Some(state)
    }

    /// Tell the log the editor has applied the last restored forest.
    pub fn resume(&mut self) {
        self.history.resume();
    }

    pub fn is_restoring(&self) -> bool {
        self.history.is_restoring()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn current_description(&self) -> &str {
        self.history.current_description()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.history.undo_description()
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.history.redo_description()
    }

    pub fn stats(&self) -> HistoryStats {
        self.history.stats()
    }

    pub fn clear_history(&mut self) {
        self.history.clear_history();
        jl_info!(hist, "history cleared");
        self.report_persist();
    }

    /// Write the log now, surfacing storage failures to the caller.
    pub fn persist(&mut self) -> SessionResult<PersistStatus> {
        self.history.persist().err_conv()
    }

    fn report_persist(&self) {
        match self.history.last_persist() {
            Some(PersistStatus::Shrunk { dropped, bytes }) => jl_warn!(
                store,
                dropped = *dropped,
                bytes = *bytes,
                "session storage full, oldest snapshots dropped"
            ),
            Some(PersistStatus::Failed { reason }) => {
                jl_warn!(store, reason = %reason, "history not persisted")
            }
            _ => {}
        }
    }

    // -- diagnostics and interchange -----------------------------------------

    pub fn check(&self, forest: &[Node]) -> Vec<CheckError> {
        jl_lang::check_forest(forest, self.catalog())
    }

    /// The forest as plain JsonLogic, one array element per rule.
    pub fn export_json_logic(&self, forest: &[Node]) -> Value {
        jl_lang::forest_to_json_logic(forest)
    }

    pub fn import_json_logic(&self, json: &Value) -> SessionResult<Vec<Node>> {
        let forest = jl_lang::forest_from_json_logic(json).owe(SessionReason::Codec)?;
        jl_debug!(conv, rules = forest.len(), "JsonLogic imported");
        Ok(forest)
    }
}

fn splice(forest: &mut [Node], id: &NodeId, node: Node) -> SessionResult<()> {
    match jl_lang::replace_in_forest(forest, id, node) {
        Some(_) => Ok(()),
        None => StructError::from(SessionReason::NodeNotFound)
            .with_detail(format!("no node with id {}", id.as_str()))
            .err(),
    }
}
