use fpid_core::{Image, Keypoint};

/// Orientation assignment and non-maximum suppression
pub struct KeypointRefinement;

impl KeypointRefinement {
    /// Compute orientation using the intensity centroid of a circular patch.
    ///
    /// Pixels outside the image are ignored; a flat patch yields 0.
    pub fn compute_orientation(img: &Image, x: f32, y: f32, patch_radius: usize) -> f32 {
        let half = patch_radius as i32;
        let (cx, cy) = (x.round() as i32, y.round() as i32);
        let (w, h) = (img.width() as i32, img.height() as i32);
        let radius_sq = half * half;

        let mut m10 = 0i64;
        let mut m01 = 0i64;

        for dy in -half..=half {
            let yy = cy + dy;
            if yy < 0 || yy >= h {
                continue;
            }
            for dx in -half..=half {
                let xx = cx + dx;
                if xx < 0 || xx >= w || dx * dx + dy * dy > radius_sq {
                    continue;
                }
                let val = img.pixel(xx as usize, yy as usize) as i64;
                m10 += dx as i64 * val;
                m01 += dy as i64 * val;
            }
        }

        if m10 == 0 && m01 == 0 {
            0.0
        } else {
            (m01 as f32).atan2(m10 as f32)
        }
    }

    /// Greedy non-maximum suppression: strongest first, dropping any keypoint
    /// closer than `min_distance` to one already kept. Equal responses keep
    /// their input order.
    pub fn non_maximum_suppression(keypoints: &[Keypoint], min_distance: f32) -> Vec<Keypoint> {
        if keypoints.is_empty() {
            return Vec::new();
        }

        let mut sorted = keypoints.to_vec();
        sort_by_response(&mut sorted);

        let mut kept: Vec<Keypoint> = Vec::new();
        let min_distance_sq = min_distance * min_distance;

        for candidate in sorted {
            let is_local_max = kept.iter().all(|existing| {
                let dx = candidate.x - existing.x;
                let dy = candidate.y - existing.y;
                dx * dx + dy * dy >= min_distance_sq
            });

            if is_local_max {
                kept.push(candidate);
            }
        }

        kept
    }
}

/// Stable sort by descending response
pub(crate) fn sort_by_response(keypoints: &mut [Keypoint]) {
    keypoints.sort_by(|a, b| b.response.total_cmp(&a.response));
}
