//! Test utilities for linegen integration tests

// Internal imports (std, crate)
use std::fs;
use std::path::{Path, PathBuf};

// External imports (alphabetized)
use anyhow::Context;
use lazy_static::lazy_static;
use tempfile::TempDir;

lazy_static! {
    /// Built-in templates of this checkout
    pub static ref WORKSPACE_TEMPLATES: PathBuf = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../templates")
        .canonicalize()
        .expect("workspace templates directory");
}

/// Creates a temporary directory for test outputs
pub fn create_temp_dir() -> anyhow::Result<(TempDir, PathBuf)> {
    let temp_dir = tempfile::tempdir()?;
    let temp_path = temp_dir.path().to_path_buf();
    Ok((temp_dir, temp_path))
}

/// Creates a test OpenAPI document in the given directory
pub fn create_test_openapi_spec(dir: &Path) -> anyhow::Result<PathBuf> {
    let spec_path = dir.join("shop.yml");
    let spec_content = r#"
openapi: 3.0.0
info:
  title: Shop API
  version: 0.0.1
  description: Shop API for linegen integration tests

paths:
  /shop/v3/users/{userId}/coupons/{couponId}:
    parameters:
      - name: userId
        in: path
        required: true
        schema:
          type: string
    get:
      operationId: getCoupon
      tags:
        - shop
      summary: Get a coupon
      parameters:
        - name: couponId
          in: path
          required: true
          schema:
            type: string
        - name: X-Line-Signature
          in: header
          required: true
          schema:
            type: string
        - name: limit
          in: query
          schema:
            type: integer
      responses:
        '200':
          description: OK
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Coupon'
        '2XX':
          description: Other success
        default:
          description: Error
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/ErrorResponse'
  /shop/v3/coupons:
    get:
      operationId: listCouponIds
      tags:
        - shop
      responses:
        '200':
          description: Coupon ids
          content:
            application/json:
              schema:
                type: array
                items:
                  type: string
        '404':
          description: Not found
          content:
            application/json:
              schema:
                type: object
                additionalProperties: true

components:
  schemas:
    Coupon:
      type: object
      required:
        - couponId
      properties:
        couponId:
          type: string
        createdAt:
          type: string
          format: date-time
        status:
          $ref: '#/components/schemas/CouponStatus'
    CouponStatus:
      type: string
      enum:
        - active
        - expired
    ErrorResponse:
      type: object
      required:
        - message
      properties:
        message:
          type: string
          description: Error message
        details:
          type: array
          items:
            $ref: '#/components/schemas/ErrorDetail'
    ErrorDetail:
      type: object
      properties:
        message:
          type: string
        property:
          type: string
    CouponId:
      type: string
"#;

    fs::write(&spec_path, spec_content)
        .with_context(|| format!("Failed to write {}", spec_path.display()))?;
    Ok(spec_path)
}
