// Copyright 2023 Parity Technologies (UK) Ltd.
// This file is part of dexcourt-client.
//
// dexcourt-client is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// dexcourt-client is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with dexcourt-client.  If not, see <http://www.gnu.org/licenses/>.
//

//! Evidence previews: uploaded files fetched into short-lived local files.
//!
//! A preview file lives exactly as long as its [`PreviewHandle`]. Loads can
//! be aborted through the [`AbortHandle`] of their [`PreviewTask`]; an
//! aborted load leaves no file behind.

use crate::{
	api::{ApiError, DexCourtApi, FileOwner},
	types::FileRef,
};
use futures::{
	FutureExt,
	future::{AbortHandle, Abortable, Aborted, BoxFuture},
};
use log::{debug, warn};
use std::{
	fs, io,
	path::{Path, PathBuf},
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicU64, Ordering},
	},
};
use thiserror::Error;

const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp"];

#[derive(Debug, Error)]
pub enum PreviewError {
	#[error(transparent)]
	Api(#[from] ApiError),
	#[error("cannot write preview: {0}")]
	Io(#[from] io::Error),
	#[error("preview load aborted")]
	Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
	Image,
	Pdf,
	Other,
}

impl PreviewKind {
	pub fn from_file_name(name: &str) -> Self {
		let extension = Path::new(name).extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
		match extension.as_deref() {
			Some("pdf") => PreviewKind::Pdf,
			Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => PreviewKind::Image,
			_ => PreviewKind::Other,
		}
	}
}

/// A loaded preview. Dropping it removes the file.
#[derive(Debug)]
pub struct PreviewHandle {
	path: PathBuf,
	kind: PreviewKind,
	/// Set once the handle is dropped, a write still in flight removes its own file.
	released: Arc<AtomicBool>,
}

impl PreviewHandle {
	fn new(path: PathBuf, kind: PreviewKind) -> Self {
		Self { path, kind, released: Arc::new(AtomicBool::new(false)) }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn kind(&self) -> PreviewKind {
		self.kind
	}
}

impl Drop for PreviewHandle {
	fn drop(&mut self) {
		self.released.store(true, Ordering::SeqCst);
		match fs::remove_file(&self.path) {
			Ok(()) => debug!("Released preview {}", self.path.display()),
			Err(e) if e.kind() == io::ErrorKind::NotFound => {},
			Err(e) => warn!("Cannot remove preview {}: {}", self.path.display(), e),
		}
	}
}

/// Writes the preview file. Either the write sees the release flag and cleans
/// up, or it finished before the handle was dropped and the drop removes it.
fn write_preview(path: &Path, bytes: &[u8], released: &AtomicBool) -> io::Result<()> {
	let written = fs::write(path, bytes);
	if released.load(Ordering::SeqCst) {
		let _ = fs::remove_file(path);
		debug!("Preview {} released during write", path.display());
	}
	written
}

/// A pending preview load.
pub struct PreviewTask {
	load: Abortable<BoxFuture<'static, Result<PreviewHandle, PreviewError>>>,
	abort: AbortHandle,
}

impl PreviewTask {
	pub fn abort_handle(&self) -> AbortHandle {
		self.abort.clone()
	}

	pub async fn run(self) -> Result<PreviewHandle, PreviewError> {
		match self.load.await {
			Ok(result) => result,
			Err(Aborted) => Err(PreviewError::Aborted),
		}
	}
}

pub struct PreviewLoader<A> {
	api: Arc<A>,
	dir: PathBuf,
	next: AtomicU64,
}

impl<A: DexCourtApi + 'static> PreviewLoader<A> {
	pub fn new(api: Arc<A>, dir: impl Into<PathBuf>) -> Self {
		Self { api, dir: dir.into(), next: AtomicU64::new(0) }
	}

	pub fn start(&self, owner: FileOwner, file: &FileRef) -> PreviewTask {
		let api = self.api.clone();
		let api_path = owner.file_path(file.id);
		let path = self.dir.join(self.local_name(file));
		let kind = PreviewKind::from_file_name(&file.file_name);
		let dir = self.dir.clone();

		let load = async move {
			let bytes = api.fetch_file(&api_path).await?;
			tokio::fs::create_dir_all(&dir).await?;
			let handle = PreviewHandle::new(path, kind);
			let (target, released) = (handle.path.clone(), handle.released.clone());
			// Runs to completion even if the load is aborted meanwhile.
			tokio::task::spawn_blocking(move || write_preview(&target, &bytes, &released))
				.await
				.map_err(io::Error::other)??;
			debug!("Preview of {} at {}", api_path, handle.path.display());
			Ok::<_, PreviewError>(handle)
		}
		.boxed();

		let (abort, registration) = AbortHandle::new_pair();
		PreviewTask { load: Abortable::new(load, registration), abort }
	}

	pub async fn load(&self, owner: FileOwner, file: &FileRef) -> Result<PreviewHandle, PreviewError> {
		self.start(owner, file).run().await
	}

	fn local_name(&self, file: &FileRef) -> String {
		let seq = self.next.fetch_add(1, Ordering::Relaxed);
		let safe: String = file
			.file_name
			.chars()
			.map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
			.collect();
		format!("preview-{}-{}-{}", file.id, seq, safe)
	}
}
