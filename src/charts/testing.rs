//! Instrumented in-memory surface host shared by chart tests.

use crate::charts::{
    ChartError, ChartFigure, ChartName, ContainerId, DisposalError, SurfaceHost, SurfaceId,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    Append { chart: ChartName, live_before: usize },
    Draw(SurfaceId),
    Destroy(SurfaceId),
}

/// Records every lifecycle call; draws and destroys can be made to fail.
#[derive(Default)]
pub(crate) struct RecordingHost {
    pub containers: BTreeMap<ContainerId, Vec<SurfaceId>>,
    pub live: HashMap<SurfaceId, ContainerId>,
    pub figures: HashMap<SurfaceId, ChartFigure>,
    pub next: u64,
    pub events: Rc<RefCell<Vec<Event>>>,
    pub fail_draw: Option<ChartName>,
    pub fail_destroy: bool,
}

impl RecordingHost {
    pub fn with_container(id: &str) -> Self {
        let mut host = Self::default();
        host.containers.insert(ContainerId::from(id), Vec::new());
        host
    }

    pub fn surfaces_in(&self, id: &str) -> usize {
        self.containers
            .get(&ContainerId::from(id))
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn appends(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Append { .. }))
            .count()
    }
}

impl SurfaceHost for RecordingHost {
    fn has_container(&self, container: &ContainerId) -> bool {
        self.containers.contains_key(container)
    }

    fn append_surface(
        &mut self,
        container: &ContainerId,
        chart: ChartName,
    ) -> Result<SurfaceId, ChartError> {
        let live_before = self.live.len();
        let surfaces = self
            .containers
            .get_mut(container)
            .ok_or_else(|| ChartError::ContainerNotFound(container.clone()))?;
        self.next += 1;
        let id = SurfaceId(self.next);
        surfaces.push(id);
        self.live.insert(id, container.clone());
        self.events
            .borrow_mut()
            .push(Event::Append { chart, live_before });
        Ok(id)
    }

    fn draw(&mut self, surface: SurfaceId, figure: &ChartFigure) -> Result<(), ChartError> {
        self.events.borrow_mut().push(Event::Draw(surface));
        if self.fail_draw == Some(figure.name) {
            return Err(ChartError::Draw {
                chart: figure.name,
                reason: "backend gone".into(),
            });
        }
        self.figures.insert(surface, figure.clone());
        Ok(())
    }

    fn destroy_surface(&mut self, surface: SurfaceId) -> Result<(), DisposalError> {
        self.events.borrow_mut().push(Event::Destroy(surface));
        self.figures.remove(&surface);
        if let Some(container) = self.live.remove(&surface) {
            if let Some(list) = self.containers.get_mut(&container) {
                list.retain(|s| *s != surface);
            }
        }
        if self.fail_destroy {
            return Err(DisposalError {
                surface,
                reason: "context lost".into(),
            });
        }
        Ok(())
    }
}
