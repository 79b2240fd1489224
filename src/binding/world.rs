use bevy::prelude::*;
use std::{
    ops::{Deref, DerefMut},
    ptr,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

/// Pointer to the running app's world, published once the app starts.
#[derive(Debug)]
pub struct UnsafeWorld(*mut World);

impl UnsafeWorld {
    pub const fn empty() -> Self {
        Self(ptr::null_mut())
    }

    fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

// The app and every binding call run on the single wasm thread.
unsafe impl Send for UnsafeWorld {}
unsafe impl Sync for UnsafeWorld {}

impl Deref for UnsafeWorld {
    type Target = World;

    fn deref(&self) -> &Self::Target {
        unsafe { &*self.0 }
    }
}

impl DerefMut for UnsafeWorld {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *self.0 }
    }
}

static WORLD: RwLock<UnsafeWorld> = RwLock::new(UnsafeWorld::empty());

pub fn set_world(world: &World) {
    let raw_world = ptr::from_ref(world).cast_mut();

    match WORLD.write() {
        Ok(mut lock) => *lock = UnsafeWorld(raw_world),
        Err(_) => error!("World handle lock is poisoned"),
    }
}

pub fn world<'w>() -> Option<RwLockReadGuard<'w, UnsafeWorld>> {
    let lock = WORLD.read().ok()?;
    (!lock.is_null()).then_some(lock)
}

pub fn world_mut<'w>() -> Option<RwLockWriteGuard<'w, UnsafeWorld>> {
    let lock = WORLD.write().ok()?;
    (!lock.is_null()).then_some(lock)
}
