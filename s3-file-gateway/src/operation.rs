/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Types for the local file upload operation
pub mod upload;

/// Types for the object download operation
pub mod download;
