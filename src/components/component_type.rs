use crate::events::{EventManager, Subscriber, SubscriptionId};
use crate::components::{ComponentFlag, ComponentPool};
use crate::entities::WorldId;
use std::marker::PhantomData;
use bytemuck::Pod;
use std::ops::Deref;

/// A record type that can be attached to entities through a typed
/// [handle](TypedComponent).
///
/// Usually implemented with `#[derive(Component)]`.
/// Hooks run on the component's bytes and are assumed to never fail.
pub trait Component: Pod {
	/// Runs on a freshly set instance, after its initial value has been written.
	const CONSTRUCT: Option<fn(&mut Self)> = None;
	/// Runs right before an instance is dropped or re-initialized.
	const DESTRUCT: Option<fn(&mut Self)> = None;
}

/// An infallible construct or destruct callback operating on raw component bytes.
pub type ComponentHook = Box<dyn Fn(&mut [u8])>;

/// A handle to a component type defined in an [EcsContext](crate::EcsContext).
///
/// Using a handle after its type has been freed panics.
#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug)]
pub struct ComponentType {
	pub(crate) index: u32,
	pub(crate) flag: ComponentFlag,
}

impl ComponentType {
	#[inline(always)]
	pub fn flag(&self) -> ComponentFlag {
		self.flag
	}

	/// Position of the type among the context's live component types.
	/// Freed indices are reused, flags are not.
	#[inline(always)]
	pub fn index(&self) -> u32 {
		self.index
	}
}

/// A [ComponentType] whose instances are known to be values of `T`.
pub struct TypedComponent<T> {
	ty: ComponentType,
	_phantom: PhantomData<fn() -> T>,
}

impl<T> TypedComponent<T> {
	pub(crate) fn new(ty: ComponentType) -> Self {
		Self {
			ty,
			_phantom: PhantomData,
		}
	}

	#[inline(always)]
	pub fn untyped(&self) -> ComponentType {
		self.ty
	}
}

impl<T> Clone for TypedComponent<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for TypedComponent<T> {}

impl<T> Deref for TypedComponent<T> {
	type Target = ComponentType;

	#[inline(always)]
	fn deref(&self) -> &Self::Target {
		&self.ty
	}
}

impl<T> From<TypedComponent<T>> for ComponentType {
	fn from(ty: TypedComponent<T>) -> Self {
		ty.ty
	}
}

#[derive(Default)]
pub(crate) struct ComponentHooks {
	pub constructor: Option<ComponentHook>,
	pub destructor: Option<ComponentHook>,
}

impl ComponentHooks {
	#[inline]
	pub fn construct(&self, bytes: &mut [u8]) {
		if let Some(constructor) = &self.constructor {
			constructor(bytes);
		}
	}

	#[inline]
	pub fn destruct(&self, bytes: &mut [u8]) {
		if let Some(destructor) = &self.destructor {
			destructor(bytes);
		}
	}

	/// Run the destructor on every occupied slot of `pool`.
	pub fn destruct_all(&self, pool: &mut ComponentPool) {
		if self.destructor.is_some() {
			for slot in 0..pool.len() {
				self.destruct(pool.record_mut(slot));
			}
		}
	}
}

/// Everything the context knows about one component type.
pub(crate) struct ComponentTypeData {
	pub flag: ComponentFlag,
	pub size: usize,
	pub hooks: ComponentHooks,
	pub pools: Vec<Option<ComponentPool>>,
	pub added: EventManager<Subscriber>,
	pub removed: EventManager<Subscriber>,
	pub world_disposed_subscription: SubscriptionId,
}

impl ComponentTypeData {
	#[inline]
	pub fn pool(&self, world: WorldId) -> Option<&ComponentPool> {
		self.pools.get(world.index()).and_then(Option::as_ref)
	}

	#[inline]
	pub fn pool_mut(&mut self, world: WorldId) -> Option<&mut ComponentPool> {
		self.pools.get_mut(world.index()).and_then(Option::as_mut)
	}

	/// Borrow a pool together with the hooks that run on its records.
	#[inline]
	pub fn split_pool(&mut self, world: WorldId) -> Option<(&mut ComponentPool, &ComponentHooks)> {
		let pool = self.pools.get_mut(world.index()).and_then(Option::as_mut)?;
		Some((pool, &self.hooks))
	}
}
