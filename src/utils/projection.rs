use bevy::{
    math::{bounding::RayCast3d, primitives::Direction3d, Ray3d},
    prelude::*,
};

/// A ray cast moved into the local space of an entity.
#[derive(Clone, Debug)]
pub struct LocalRay {
    pub cast: RayCast3d,
    /// Local units per world unit along the ray direction.
    pub scale: f32,
}

impl LocalRay {
    /// Converts a distance along the local ray back into world units.
    pub fn world_distance(&self, local_t: f32) -> f32 {
        local_t / self.scale
    }
}

/// Moves a world-space ray into the space described by `transform`.
///
/// `max` is a world distance and is rescaled along with the direction. Returns `None` when
/// the transform cannot be inverted.
pub fn ray_cast_to_local(ray: Ray3d, max: f32, transform: &GlobalTransform) -> Option<LocalRay> {
    let inverse = transform.affine().inverse();

    let origin = inverse.transform_point3(ray.origin);
    let direction = inverse.transform_vector3(ray.direction.into());

    let scale = direction.length();

    if !origin.is_finite() || !scale.is_finite() {
        return None;
    }

    let direction = Direction3d::new(direction).ok()?;

    Some(LocalRay {
        cast: RayCast3d::from_ray(Ray3d { origin, direction }, max * scale),
        scale,
    })
}

#[cfg(test)]
mod test {
    use bevy::{
        math::{primitives::Direction3d, Ray3d},
        prelude::*,
    };

    use super::ray_cast_to_local;

    #[test]
    fn test_ray_into_translated_and_scaled_space() {
        let transform = GlobalTransform::from(
            Transform::from_xyz(10.0, 0.0, 0.0).with_scale(Vec3::splat(2.0)),
        );

        let ray = Ray3d {
            origin: Vec3::new(10.0, 0.0, 4.0),
            direction: Direction3d::new(Vec3::NEG_Z).unwrap(),
        };

        let local = ray_cast_to_local(ray, 100.0, &transform).unwrap();

        assert!((local.cast.ray.origin - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-5);
        assert!((Vec3::from(local.cast.ray.direction) - Vec3::NEG_Z).length() < 1e-5);
        assert!((local.scale - 0.5).abs() < 1e-5);
        assert!((local.cast.max - 50.0).abs() < 1e-3);
        assert!((local.world_distance(2.0) - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_rotated_space() {
        let transform =
            GlobalTransform::from(Transform::from_rotation(Quat::from_rotation_y(
                std::f32::consts::FRAC_PI_2,
            )));

        let ray = Ray3d {
            origin: Vec3::new(3.0, 0.0, 0.0),
            direction: Direction3d::new(Vec3::NEG_X).unwrap(),
        };

        let local = ray_cast_to_local(ray, 100.0, &transform).unwrap();

        // rotating +z by 90 degrees about y gives +x, so the inverse maps +x back onto +z
        assert!((local.cast.ray.origin - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-5);
        assert!((Vec3::from(local.cast.ray.direction) - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_singular_transform_has_no_local_ray() {
        let transform = GlobalTransform::from(Transform::from_scale(Vec3::new(1.0, 0.0, 1.0)));

        let ray = Ray3d {
            origin: Vec3::new(0.0, 1.0, 0.0),
            direction: Direction3d::new(Vec3::NEG_Y).unwrap(),
        };

        assert!(ray_cast_to_local(ray, 100.0, &transform).is_none());
    }
}
