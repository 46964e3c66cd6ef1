//! Session coordinator.
//!
//! # Responsibility
//! - Load the session's project set from storage at startup.
//! - Route UI-level operations to the owning project.
//! - Ask the rendering collaborator to refresh after mutations.
//!
//! # Invariants
//! - The coordinator exclusively owns the in-memory project list.
//! - Entities never call the renderer; only the coordinator does.
//! - Unknown project ids leave every project untouched.

use crate::model::project::{Project, ProjectError, ProjectId};
use crate::model::todo::{Todo, TodoId};
use crate::storage::{Storage, StorageError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type AppResult<T> = Result<T, AppError>;

/// Errors from coordinator operations.
#[derive(Debug)]
pub enum AppError {
    /// No project with this id in the session.
    ProjectNotFound(ProjectId),
    /// Project exists but has no todo with this id.
    TodoNotFound {
        project_id: ProjectId,
        todo_id: TodoId,
    },
    /// Membership change rejected by the project.
    Project(ProjectError),
    /// Storage-wide operation failed.
    Storage(StorageError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::TodoNotFound {
                project_id,
                todo_id,
            } => write!(f, "todo {todo_id} not found in project {project_id}"),
            Self::Project(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Project(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::ProjectNotFound(_) | Self::TodoNotFound { .. } => None,
        }
    }
}

impl From<ProjectError> for AppError {
    fn from(value: ProjectError) -> Self {
        Self::Project(value)
    }
}

impl From<StorageError> for AppError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Display collaborator driven by the coordinator.
pub trait Renderer {
    /// Draws (or redraws) a whole project card.
    fn render_project(&mut self, project: &Project);
    /// Redraws only the todo list of a project.
    fn render_project_todos(&mut self, project: &Project);
    /// Called by `display_all` when there is nothing to show yet.
    fn render_empty(&mut self) {}
}

/// Renderer for headless sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    fn render_project(&mut self, _project: &Project) {}

    fn render_project_todos(&mut self, _project: &Project) {}
}

/// Reconstructs every registered project.
///
/// Ids that fail to resolve are skipped with a warning. An unavailable
/// store yields an empty set.
pub fn load_all(storage: &Rc<Storage>) -> Vec<Project> {
    let ids = match storage.list_project_ids() {
        Ok(ids) => ids,
        Err(_) => return Vec::new(),
    };

    let mut projects = Vec::with_capacity(ids.len());
    for id in &ids {
        match storage.restore_project(id) {
            Ok(project) => projects.push(project),
            Err(err) => warn!(
                "event=load_all module=service status=skip reason={} project_id={id}",
                err.code()
            ),
        }
    }
    info!(
        "event=load_all module=service status=ok registered={} loaded={}",
        ids.len(),
        projects.len()
    );
    projects
}

/// Coordinator for one session: storage handle, project set, renderer.
pub struct App<R: Renderer> {
    storage: Rc<Storage>,
    projects: Vec<Project>,
    renderer: R,
}

impl<R: Renderer> App<R> {
    /// Builds the session by loading every registered project.
    pub fn load(storage: Rc<Storage>, renderer: R) -> Self {
        let projects = load_all(&storage);
        Self {
            storage,
            projects,
            renderer,
        }
    }

    /// Shared storage handle for constructing new entities.
    pub fn storage(&self) -> &Rc<Storage> {
        &self.storage
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.id() == project_id)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Renders every project, or the empty-state prompt when there is none.
    pub fn display_all(&mut self) {
        if self.projects.is_empty() {
            self.renderer.render_empty();
            return;
        }
        for project in &self.projects {
            self.renderer.render_project(project);
        }
    }

    /// Creates, registers, and adds a new project. Returns its id.
    pub fn create_project(&mut self, name: impl Into<String>) -> ProjectId {
        let project = Project::new(&self.storage, name);
        let id = project.id().to_string();
        self.add_project(project);
        id
    }

    /// Adds an already-persisted project to the session and renders it.
    pub fn add_project(&mut self, project: Project) {
        self.renderer.render_project(&project);
        self.projects.push(project);
    }

    /// Renames a project and redraws its card.
    pub fn rename_project(&mut self, project_id: &str, name: impl Into<String>) -> AppResult<()> {
        let index = self.position(project_id)?;
        let project = &mut self.projects[index];
        project.set_name(name);
        self.renderer.render_project(project);
        Ok(())
    }

    /// Adds a todo to the project with `project_id`.
    pub fn add_todo_to_project(&mut self, project_id: &str, todo: Todo) -> AppResult<()> {
        let index = self.position(project_id)?;
        self.projects[index].add_todo(todo)?;
        Ok(())
    }

    /// Removes a todo from its project and deletes the todo's record.
    ///
    /// The record is deleted even when the project did not list the todo.
    pub fn delete_todo_from_project(&mut self, project_id: &str, todo_id: &str) -> AppResult<Option<Todo>> {
        let index = self.position(project_id)?;
        let removed = self.projects[index].delete_todo(todo_id);
        // Logged by `Storage`; an orphaned record is only unreachable data.
        let _ = self.storage.delete_item(todo_id);
        Ok(removed)
    }

    /// Sets a todo's done flag (the card checkbox) and redraws the list.
    pub fn set_todo_done(&mut self, project_id: &str, todo_id: &str, done: bool) -> AppResult<()> {
        let index = self.position(project_id)?;
        let project = &mut self.projects[index];
        let todo = project.todo_mut(todo_id).ok_or_else(|| AppError::TodoNotFound {
            project_id: project_id.to_string(),
            todo_id: todo_id.to_string(),
        })?;
        todo.set_done(done);
        self.renderer.render_project_todos(project);
        Ok(())
    }

    /// Re-renders a project's todo list from in-memory state.
    pub fn refresh(&mut self, project_id: &str) -> AppResult<()> {
        let index = self.position(project_id)?;
        self.renderer.render_project_todos(&self.projects[index]);
        Ok(())
    }

    /// Wipes every persisted key and empties the session.
    pub fn delete_all(&mut self) -> AppResult<()> {
        self.storage.delete_all()?;
        self.projects.clear();
        info!("event=delete_all module=service status=ok");
        Ok(())
    }

    fn position(&self, project_id: &str) -> AppResult<usize> {
        self.projects
            .iter()
            .position(|project| project.id() == project_id)
            .ok_or_else(|| {
                error!(
                    "event=project_lookup module=service status=error error_code=project_not_found project_id={project_id}"
                );
                AppError::ProjectNotFound(project_id.to_string())
            })
    }
}
